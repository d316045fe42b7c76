use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod issue;
pub mod structured;
pub mod text_utils;

pub use backend::{BackendError, DocumentBackend};
pub use issue::EvaluationIssue;
pub use structured::{ParseStatus, StructuredParse, StructuredParser, StructuredReference};

/// Citation norm a document can be evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    Apa,
    Ieee,
}

impl Norm {
    /// Lowercase identifier used in URLs and on the wire (`apa`, `ieee`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Norm::Apa => "apa",
            Norm::Ieee => "ieee",
        }
    }

    /// Uppercase label used in summaries and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Norm::Apa => "APA",
            Norm::Ieee => "IEEE",
        }
    }

    /// Map a detected style to the nearest evaluable norm.
    ///
    /// Only numeric styles (IEEE, Vancouver) map to IEEE; every other
    /// classification, including `Unknown`, defaults to APA.
    pub fn from_style(style: CitationStyle) -> Self {
        match style {
            CitationStyle::Ieee | CitationStyle::Vancouver => Norm::Ieee,
            _ => Norm::Apa,
        }
    }
}

impl fmt::Display for Norm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Norm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apa" => Ok(Norm::Apa),
            "ieee" => Ok(Norm::Ieee),
            other => Err(format!("unknown norm '{}' (expected apa or ieee)", other)),
        }
    }
}

/// Citation style families recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CitationStyle {
    Apa,
    Ieee,
    Vancouver,
    Chicago,
    Mla,
    Harvard,
    Unknown,
}

impl CitationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "APA",
            CitationStyle::Ieee => "IEEE",
            CitationStyle::Vancouver => "VANCOUVER",
            CitationStyle::Chicago => "CHICAGO",
            CitationStyle::Mla => "MLA",
            CitationStyle::Harvard => "HARVARD",
            CitationStyle::Unknown => "DESCONOCIDO",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength of a style classification, from vote share and sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::None => "NINGUNA",
            Confidence::Low => "BAJA",
            Confidence::Medium => "MEDIA",
            Confidence::High => "ALTA",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dominant citation style inferred from a set of entries and markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleClassification {
    #[serde(rename = "estilo")]
    pub style: CitationStyle,
    #[serde(rename = "confianza")]
    pub confidence: Confidence,
    /// Per-style evidence tally. Styles without evidence are absent.
    #[serde(rename = "distribucion")]
    pub evidence_counts: BTreeMap<CitationStyle, usize>,
    /// Number of entries/markers that matched any style pattern.
    #[serde(rename = "analizadas")]
    pub classified: usize,
}

impl StyleClassification {
    /// Classification used when nothing could be classified.
    pub fn unknown() -> Self {
        Self {
            style: CitationStyle::Unknown,
            confidence: Confidence::None,
            evidence_counts: BTreeMap::new(),
            classified: 0,
        }
    }

    /// Percentage of classified entries that voted for the dominant style.
    pub fn share_pct(&self) -> f64 {
        if self.classified == 0 {
            return 0.0;
        }
        let count = self.evidence_counts.get(&self.style).copied().unwrap_or(0);
        count as f64 * 100.0 / self.classified as f64
    }

    /// Human-readable description of the vote.
    pub fn details(&self) -> String {
        if self.classified == 0 {
            return "No se pudo detectar el estilo de citación".to_string();
        }
        format!(
            "{} referencias analizadas. {} detectado en {:.1}% de las referencias.",
            self.classified,
            self.style,
            self.share_pct()
        )
    }
}

/// One bibliographic record from the reference list, whitespace-normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceEntry(String);

impl ReferenceEntry {
    /// Build an entry, collapsing every whitespace run to a single space.
    pub fn new(text: &str) -> Self {
        Self(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Equality key for deduplication: lowercase, whitespace-collapsed.
    pub fn dedup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ReferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verdict for a single reference entry or inline citation marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationVerdict {
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "es_valida")]
    pub is_valid: bool,
    #[serde(rename = "razon")]
    pub reason: Option<String>,
}

impl CitationVerdict {
    pub fn valid(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_valid: true,
            reason: None,
        }
    }

    pub fn invalid(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of evaluating one document against a norm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormResult {
    #[serde(rename = "norma")]
    pub norm: Norm,
    #[serde(rename = "cumple")]
    pub compliant: bool,
    #[serde(rename = "errores")]
    pub errors: Vec<String>,
    #[serde(rename = "citas_validas")]
    pub valid_citations: Vec<CitationVerdict>,
    #[serde(rename = "citas_invalidas")]
    pub invalid_citations: Vec<CitationVerdict>,
    #[serde(rename = "total_citas")]
    pub total_citations: usize,
    #[serde(rename = "estilo_detectado")]
    pub detected_style: Option<StyleClassification>,
    #[serde(rename = "detalles")]
    pub summary: String,
    /// Inline markers from the structured parse, graded against the norm.
    /// Informational only; does not affect `compliant` or the entry lists.
    #[serde(rename = "citas_en_texto", default)]
    pub inline_citations: Vec<CitationVerdict>,
}

impl NormResult {
    /// A non-compliant result carrying a single terminal issue.
    pub fn terminal(norm: Norm, issue: &EvaluationIssue) -> Self {
        debug_assert!(issue.is_terminal(), "{issue:?} does not end an evaluation");
        let message = issue.to_string();
        Self {
            norm,
            compliant: false,
            errors: vec![message.clone()],
            valid_citations: Vec::new(),
            invalid_citations: Vec::new(),
            total_citations: 0,
            detected_style: None,
            summary: message,
            inline_citations: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_parses_case_insensitively() {
        assert_eq!("APA".parse::<Norm>().unwrap(), Norm::Apa);
        assert_eq!(" ieee ".parse::<Norm>().unwrap(), Norm::Ieee);
        assert!("mla".parse::<Norm>().is_err());
    }

    #[test]
    fn only_numeric_styles_map_to_ieee() {
        assert_eq!(Norm::from_style(CitationStyle::Ieee), Norm::Ieee);
        assert_eq!(Norm::from_style(CitationStyle::Vancouver), Norm::Ieee);
        assert_eq!(Norm::from_style(CitationStyle::Unknown), Norm::Apa);
        assert_eq!(Norm::from_style(CitationStyle::Harvard), Norm::Apa);
        assert_eq!(Norm::from_style(CitationStyle::Chicago), Norm::Apa);
    }

    #[test]
    fn reference_entry_collapses_whitespace() {
        let entry = ReferenceEntry::new("  Smith, J.\n (2020).   Title.\t");
        assert_eq!(entry.as_str(), "Smith, J. (2020). Title.");
        assert_eq!(entry.dedup_key(), "smith, j. (2020). title.");
    }

    #[test]
    fn share_pct_uses_dominant_count() {
        let mut counts = BTreeMap::new();
        counts.insert(CitationStyle::Ieee, 8);
        counts.insert(CitationStyle::Apa, 2);
        let c = StyleClassification {
            style: CitationStyle::Ieee,
            confidence: Confidence::High,
            evidence_counts: counts,
            classified: 10,
        };
        assert!((c.share_pct() - 80.0).abs() < f64::EPSILON);
        assert!(c.details().contains("IEEE detectado en 80.0%"));
    }

    #[test]
    fn norm_result_serializes_with_wire_names() {
        let result = NormResult::terminal(Norm::Apa, &EvaluationIssue::InputEmpty);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["norma"], "apa");
        assert_eq!(json["cumple"], false);
        assert_eq!(json["total_citas"], 0);
        assert_eq!(json["errores"][0], "El documento está vacío");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not end an evaluation")]
    fn terminal_result_rejects_recoverable_issue() {
        let _ = NormResult::terminal(Norm::Apa, &EvaluationIssue::NoReferencesDetected);
    }
}
