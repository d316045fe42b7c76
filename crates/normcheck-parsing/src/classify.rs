use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use normcheck_core::{CitationStyle, Confidence, ReferenceEntry, StyleClassification};

use crate::config::ParsingConfig;

// Surname: capital letter followed by lowercase letters, allowing
// apostrophes and hyphenated compounds (O'Brien, García-Márquez).
macro_rules! surname {
    () => {
        r"\p{Lu}\p{Ll}+(?:['’\-]\p{Lu}?\p{Ll}+)*"
    };
}

static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]").unwrap());

static LEADING_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*\p{Lu}").unwrap());

/// Volume / page / issue abbreviations that single out IEEE among the
/// numeric styles.
static IEEE_MARKERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:vol|pp|no)\.").unwrap());

/// `Surname, I. (YYYY)` with an optional second author, not followed by a
/// quoted title (that shape is Harvard).
static APA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        surname!(),
        r",\s+\p{Lu}\.(?:\s*-?\p{Lu}\.)*",
        r"(?:,?\s*(?:&|y)\s+",
        surname!(),
        r",\s+\p{Lu}\.(?:\s*-?\p{Lu}\.)*)?",
        r"\s*\(\d{4}[a-z]?\)(?:\s*[^\s'‘’\x22“”]|\s*$)",
    ))
    .unwrap()
});

/// `Surname, Name. YYYY. "Title."`
static CHICAGO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        surname!(),
        r",\s+\p{Lu}\p{Ll}+\.\s+\d{4}\.\s+[\x22“]"
    ))
    .unwrap()
});

/// `Surname, Name. "Title." Publisher, YYYY`
static MLA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        surname!(),
        r",\s+\p{Lu}\p{Ll}+\.\s+[\x22“][^\x22“”]+[\x22”]\.?\s+[^,]+,\s+\d{4}"
    ))
    .unwrap()
});

/// `Surname, I. (YYYY) 'Title'`
static HARVARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        surname!(),
        r",\s+\p{Lu}\.(?:\s*-?\p{Lu}\.)*\s*\(\d{4}[a-z]?\)\s*['‘\x22“]"
    ))
    .unwrap()
});

/// Any capitalized word followed later by `(YYYY)`.
static AUTHOR_YEAR_FALLBACK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Lu}\p{Ll}+.*\(\d{4}[a-z]?\)").unwrap());

/// Inline numeric marker: `[3]`, `[3-5]`, `[1, 4]`.
static NUMERIC_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*\d+(?:\s*[-–,]\s*\d+)*\s*\]$").unwrap());

/// Inline author-year marker, with or without parentheses:
/// `(Smith, 2020)`, `Smith et al., 2020`.
static AUTHOR_YEAR_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?\s*\p{Lu}[^()\[\]]*,\s*\d{4}[a-z]?\s*\)?$").unwrap());

/// Style evidence carried by one reference entry, if any.
///
/// Patterns are tried in priority order; the first match wins.
pub fn classify_entry(entry: &str) -> Option<CitationStyle> {
    let text = entry.trim();

    if BRACKETED_RE.is_match(text) {
        return Some(CitationStyle::Ieee);
    }
    if LEADING_DIGIT_RE.is_match(text) {
        return Some(if IEEE_MARKERS_RE.is_match(text) {
            CitationStyle::Ieee
        } else {
            CitationStyle::Vancouver
        });
    }
    if APA_RE.is_match(text) {
        return Some(CitationStyle::Apa);
    }
    if CHICAGO_RE.is_match(text) {
        return Some(CitationStyle::Chicago);
    }
    if MLA_RE.is_match(text) {
        return Some(CitationStyle::Mla);
    }
    if HARVARD_RE.is_match(text) {
        return Some(CitationStyle::Harvard);
    }
    if AUTHOR_YEAR_FALLBACK_RE.is_match(text) {
        return Some(CitationStyle::Apa);
    }
    None
}

/// Style evidence carried by one inline citation marker, if any.
pub fn classify_marker(marker: &str) -> Option<CitationStyle> {
    let text = marker.trim();
    if NUMERIC_MARKER_RE.is_match(text) {
        Some(CitationStyle::Ieee)
    } else if AUTHOR_YEAR_MARKER_RE.is_match(text) {
        Some(CitationStyle::Apa)
    } else {
        None
    }
}

/// Infer the dominant citation style from reference entries and inline
/// markers.
///
/// At most `classifier_sample` entries and, separately, that many markers
/// are looked at. Exact ties go to IEEE when IEEE and APA share the top
/// count; any other tie is reported as unknown.
pub fn classify_style(
    entries: &[ReferenceEntry],
    markers: &[String],
    config: &ParsingConfig,
) -> StyleClassification {
    let sample = config.classifier_sample;

    let votes = entries
        .iter()
        .take(sample)
        .filter_map(|e| classify_entry(e.as_str()))
        .chain(
            markers
                .iter()
                .take(sample)
                .filter_map(|m| classify_marker(m)),
        );

    let mut evidence_counts: BTreeMap<CitationStyle, usize> = BTreeMap::new();
    for style in votes {
        *evidence_counts.entry(style).or_insert(0) += 1;
    }
    let classified: usize = evidence_counts.values().sum();

    let Some(top) = evidence_counts.values().copied().max() else {
        tracing::debug!("no entry matched any style pattern");
        return StyleClassification::unknown();
    };

    let leaders: Vec<CitationStyle> = evidence_counts
        .iter()
        .filter(|&(_, &count)| count == top)
        .map(|(&style, _)| style)
        .collect();

    let style = match leaders.as_slice() {
        [only] => *only,
        tied if tied.contains(&CitationStyle::Ieee) && tied.contains(&CitationStyle::Apa) => {
            CitationStyle::Ieee
        }
        _ => CitationStyle::Unknown,
    };

    let confidence = if style == CitationStyle::Unknown {
        Confidence::Low
    } else {
        confidence_for(top, classified)
    };

    tracing::debug!(
        style = style.as_str(),
        confidence = confidence.label(),
        classified,
        "classified citation style"
    );

    StyleClassification {
        style,
        confidence,
        evidence_counts,
        classified,
    }
}

fn confidence_for(count: usize, classified: usize) -> Confidence {
    let share = count as f64 * 100.0 / classified as f64;
    if share >= 70.0 && classified >= 5 {
        Confidence::High
    } else if share >= 50.0 && classified >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(texts: &[&str]) -> Vec<ReferenceEntry> {
        texts.iter().map(|t| ReferenceEntry::new(t)).collect()
    }

    fn classify(texts: &[&str]) -> StyleClassification {
        classify_style(&entries(texts), &[], &ParsingConfig::default())
    }

    const IEEE: &str = "[1] J. Smith, \"Deep nets,\" IEEE Trans., vol. 3, pp. 1-9, 2020.";
    const APA: &str = "García, J. (2020). Inteligencia artificial. Editorial Sur.";

    #[test]
    fn test_classify_entry_priority() {
        assert_eq!(classify_entry(IEEE), Some(CitationStyle::Ieee));
        assert_eq!(classify_entry(APA), Some(CitationStyle::Apa));
        assert_eq!(
            classify_entry("1. Smith J. Cancer screening. Lancet. 2019;3:1-5."),
            Some(CitationStyle::Vancouver)
        );
        assert_eq!(
            classify_entry("2. A. Jones, \"Radar,\" Proc. IEEE, vol. 4, no. 2, 2018."),
            Some(CitationStyle::Ieee)
        );
        assert_eq!(
            classify_entry("Pérez, M. A., & López, R. (2019). Estudio. Revista."),
            Some(CitationStyle::Apa)
        );
    }

    #[test]
    fn test_classify_entry_author_styles() {
        assert_eq!(
            classify_entry("Smith, John. 2020. \"Title of Work.\" Journal 4: 1-9."),
            Some(CitationStyle::Chicago)
        );
        assert_eq!(
            classify_entry("Smith, John. \"Title of Work.\" Penguin, 2020."),
            Some(CitationStyle::Mla)
        );
        assert_eq!(
            classify_entry("Smith, J. (2020) 'Title of work', Publisher."),
            Some(CitationStyle::Harvard)
        );
        assert_eq!(
            classify_entry("Organización Mundial de la Salud (2021). Informe anual."),
            Some(CitationStyle::Apa)
        );
        assert_eq!(classify_entry("texto sin rasgos de referencia 2020"), None);
    }

    #[test]
    fn test_classify_marker() {
        assert_eq!(classify_marker("[3]"), Some(CitationStyle::Ieee));
        assert_eq!(classify_marker("[3-5]"), Some(CitationStyle::Ieee));
        assert_eq!(classify_marker("(Smith, 2020)"), Some(CitationStyle::Apa));
        assert_eq!(classify_marker("Smith et al., 2020"), Some(CitationStyle::Apa));
        assert_eq!(classify_marker("Figure 3"), None);
    }

    #[test]
    fn test_eight_ieee_two_apa_is_high_ieee() {
        let mut texts = vec![IEEE; 8];
        texts.extend([APA, APA]);
        let c = classify(&texts);
        assert_eq!(c.style, CitationStyle::Ieee);
        assert_eq!(c.confidence, Confidence::High);
        assert_eq!(c.classified, 10);
        assert_eq!(c.evidence_counts[&CitationStyle::Ieee], 8);
        assert_eq!(c.evidence_counts[&CitationStyle::Apa], 2);
    }

    #[test]
    fn test_empty_is_unknown_none() {
        let c = classify(&[]);
        assert_eq!(c.style, CitationStyle::Unknown);
        assert_eq!(c.confidence, Confidence::None);
        assert!(c.evidence_counts.is_empty());
    }

    #[test]
    fn test_unclassifiable_is_unknown_none() {
        let c = classify(&["nada reconocible aquí, 2020.", "otra línea, sin forma, 2019."]);
        assert_eq!(c.style, CitationStyle::Unknown);
        assert_eq!(c.confidence, Confidence::None);
    }

    #[test]
    fn test_medium_and_low_confidence() {
        let c = classify(&[APA, APA, IEEE]);
        assert_eq!(c.style, CitationStyle::Apa);
        assert_eq!(c.confidence, Confidence::Medium);

        let c = classify(&[APA, APA]);
        assert_eq!(c.style, CitationStyle::Apa);
        assert_eq!(c.confidence, Confidence::Low);
    }

    #[test]
    fn test_ieee_apa_tie_prefers_ieee() {
        let c = classify(&[APA, IEEE, APA, IEEE]);
        assert_eq!(c.style, CitationStyle::Ieee);
        assert_eq!(c.confidence, Confidence::Medium);
    }

    #[test]
    fn test_other_tie_is_unknown() {
        let harvard = "Smith, J. (2020) 'Title of work', Publisher.";
        let c = classify(&[APA, harvard]);
        assert_eq!(c.style, CitationStyle::Unknown);
        assert_eq!(c.confidence, Confidence::Low);
        assert_eq!(c.classified, 2);
    }

    #[test]
    fn test_sample_cap_applies() {
        let mut texts = vec![APA; 15];
        texts.extend(vec![IEEE; 20]);
        let c = classify(&texts);
        assert_eq!(c.style, CitationStyle::Apa);
        assert_eq!(c.classified, 15);
    }

    #[test]
    fn test_markers_add_evidence() {
        let markers: Vec<String> = ["[1]", "[2]", "[3]"].iter().map(|s| s.to_string()).collect();
        let c = classify_style(&entries(&[APA]), &markers, &ParsingConfig::default());
        assert_eq!(c.style, CitationStyle::Ieee);
        assert_eq!(c.classified, 4);
    }
}
