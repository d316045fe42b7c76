use once_cell::sync::Lazy;
use regex::Regex;

use normcheck_core::ReferenceEntry;

use crate::config::ParsingConfig;

/// Structural shape of a line that opens a new reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartPattern {
    /// `12. Surname ...`
    Numbered,
    /// `[12] Name ...` (IEEE / Vancouver)
    Bracketed,
    /// `Surname, I.` optionally followed by `& Surname2, I2.` / `y Surname2, I2.`
    AuthorInitial,
    /// `Capitalized Words (YYYY)`, an organization as author.
    Organization,
}

/// Decision taken for one line of the bibliography section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    NewEntry(StartPattern),
    Continuation,
    /// A trailing-section marker: stop, the line is not part of the output.
    Halt,
}

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,4}\.\s*\p{Lu}[\p{L}'’\-]+").unwrap());

static BRACKETED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d{1,4}\]\s*\p{Lu}").unwrap());

/// A surname as it opens a reference: one or two capitalized words, each
/// optionally preceded by particles ("De la Cruz", "van der Berg", "Ruiz de Alarcón").
macro_rules! particle_surname {
    () => {
        r"(?:(?:[Dd]e|[Dd]el|[Ll]a|[Ll]as|[Ll]os|[Dd]a|[Dd]as|[Dd]os|[Vv]an|[Vv]on|[Dd]er|[Dd]en)\s+)*\p{Lu}[\p{L}'’\-]+(?:\s+(?:(?:de|del|la|las|los|da|das|dos|van|von|der|den)\s+)*\p{Lu}[\p{L}'’\-]+)?"
    };
}

static AUTHOR_INITIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "^",
        particle_surname!(),
        r",\s*\p{Lu}\.(?:\s*-?\p{Lu}\.)*(?:,?\s*(?:&|y)\s+",
        particle_surname!(),
        r",\s*\p{Lu}\.)?",
    ))
    .unwrap()
});

static ORGANIZATION_RE: Lazy<Regex> = Lazy::new(|| {
    // Lowercase connectors are allowed between the capitalized words
    // ("Organización Mundial de la Salud (2021)").
    Regex::new(
        r"^\p{Lu}[\p{L}\-]+(?:\s+(?:(?:de|del|la|las|los|el|y|e|of|the|for|and|on)\s+)*\p{Lu}[\p{L}\-]+)+\.?\s*\(\d{4}",
    )
    .unwrap()
});

/// Year-like evidence a structural match must carry: `(YYYY)`, `YYYY)`,
/// `, YYYY` or `. (YYYY`.
static YEAR_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{4}\)|\d{4}\)|,\s*\d{4}|\.\s*\(\d{4}").unwrap());

/// Start patterns in evaluation order; the first match wins.
const START_PATTERNS: &[StartPattern] = &[
    StartPattern::Numbered,
    StartPattern::Bracketed,
    StartPattern::AuthorInitial,
    StartPattern::Organization,
];

impl StartPattern {
    fn regex(&self) -> &'static Regex {
        match self {
            StartPattern::Numbered => &NUMBERED_RE,
            StartPattern::Bracketed => &BRACKETED_RE,
            StartPattern::AuthorInitial => &AUTHOR_INITIAL_RE,
            StartPattern::Organization => &ORGANIZATION_RE,
        }
    }

    /// First structural pattern matching the start of `line`.
    pub fn detect(line: &str) -> Option<Self> {
        START_PATTERNS
            .iter()
            .copied()
            .find(|p| p.regex().is_match(line))
    }
}

/// Lines accumulated for one reference while walking the section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    lines: Vec<String>,
    /// Pattern that opened the entry; `None` for text preceding the first
    /// recognised entry.
    pub pattern: Option<StartPattern>,
}

impl CandidateEntry {
    fn open(line: &str, pattern: Option<StartPattern>) -> Self {
        Self {
            lines: vec![line.to_string()],
            pattern,
        }
    }

    fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_line(&self) -> &str {
        &self.lines[0]
    }

    /// Lines joined with single spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    pub fn finalize(self) -> ReferenceEntry {
        ReferenceEntry::new(&self.text())
    }
}

/// Decide whether a trimmed, non-empty line opens a new entry.
///
/// Order matters: trailing markers halt, narrative openers are always
/// continuations, and a structural match only counts when the line also
/// carries a year-like token.
pub fn classify_line(line: &str, config: &ParsingConfig) -> LineKind {
    if config.is_trailing_marker(line) {
        return LineKind::Halt;
    }
    if config.has_narrative_prefix(line) {
        return LineKind::Continuation;
    }
    match StartPattern::detect(line) {
        Some(pattern) if YEAR_LIKE_RE.is_match(line) => LineKind::NewEntry(pattern),
        _ => LineKind::Continuation,
    }
}

/// Split a bibliography section into candidate entries, in source order.
///
/// Continuation lines are appended to the entry being built. Text before the
/// first recognised entry forms its own candidate and is left for the
/// validator to judge.
pub fn segment_entries(section: &str, config: &ParsingConfig) -> Vec<CandidateEntry> {
    let (mut finished, pending) = section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| (line, classify_line(line, config)))
        .take_while(|(_, kind)| *kind != LineKind::Halt)
        .fold(
            (Vec::new(), None::<CandidateEntry>),
            |(mut finished, pending), (line, kind)| match (kind, pending) {
                (LineKind::NewEntry(pattern), pending) => {
                    finished.extend(pending);
                    (finished, Some(CandidateEntry::open(line, Some(pattern))))
                }
                (_, Some(mut current)) => {
                    current.push(line);
                    (finished, Some(current))
                }
                (_, None) => (finished, Some(CandidateEntry::open(line, None))),
            },
        );
    finished.extend(pending);

    tracing::debug!(candidates = finished.len(), "segmented bibliography");
    finished
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<CandidateEntry> {
        segment_entries(text, &ParsingConfig::default())
    }

    #[test]
    fn test_detect_start_patterns() {
        assert_eq!(
            StartPattern::detect("3. García, J. (2020). Título."),
            Some(StartPattern::Numbered)
        );
        assert_eq!(
            StartPattern::detect("[12] J. Smith, \"Title,\" 2020."),
            Some(StartPattern::Bracketed)
        );
        assert_eq!(
            StartPattern::detect("Pérez, M. A., & López, R. (2019). Estudio."),
            Some(StartPattern::AuthorInitial)
        );
        assert_eq!(
            StartPattern::detect("Ruiz, A. y Gómez, B. (2018). Obra."),
            Some(StartPattern::AuthorInitial)
        );
        assert_eq!(
            StartPattern::detect("Organización Mundial de la Salud (2021). Informe."),
            Some(StartPattern::Organization)
        );
        assert_eq!(StartPattern::detect("continúa el título del artículo"), None);
    }

    #[test]
    fn test_detect_particle_surnames() {
        for line in [
            "De la Cruz, M. (2019). Obra.",
            "van der Berg, P. (2018). Study.",
            "Da Silva, A. (2017). Estudo.",
            "Von Neumann, J. (1945). Report.",
            "Ruiz de Alarcón, J. (2015). Comedias.",
            "García, J., & de los Santos, R. (2016). Obra.",
        ] {
            assert_eq!(
                StartPattern::detect(line),
                Some(StartPattern::AuthorInitial),
                "{line}"
            );
        }
    }

    #[test]
    fn test_segment_particle_surnames_open_entries() {
        let text = "García, J. (2020). Inteligencia artificial. Editorial X.\nDe la Cruz, M. (2019). Redes neuronales. Revista Y, 4(2), 10-20.\nvan der Berg, P. (2018). Machine learning. Publisher Z.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 3);
        assert!(entries[1].first_line().starts_with("De la Cruz, M. (2019)"));
        assert!(entries[2].first_line().starts_with("van der Berg, P. (2018)"));
        assert!(
            entries
                .iter()
                .all(|e| e.pattern == Some(StartPattern::AuthorInitial))
        );
    }

    #[test]
    fn test_segment_apa_with_continuations() {
        let text = "\nGarcía, J. (2020). Inteligencia artificial aplicada\na la educación superior. Revista X, 4(2), 10-20.\nPérez, M. (2019). Aprendizaje automático. Editorial Y.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].text(),
            "García, J. (2020). Inteligencia artificial aplicada a la educación superior. Revista X, 4(2), 10-20."
        );
        assert_eq!(entries[0].pattern, Some(StartPattern::AuthorInitial));
        assert!(entries[1].first_line().starts_with("Pérez, M. (2019)"));
    }

    #[test]
    fn test_segment_bracketed() {
        let text = "[1] J. Smith, \"A title,\" IEEE Trans., vol. 5, pp. 1-9, 2020.\n[2] A. Jones, \"Other,\"\nin Proc. Conf., 2019.\n[3] B. Lee, \"Third,\" 2018.";
        let entries = segment(text);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].lines().len(), 2);
        assert!(entries.iter().all(|e| e.pattern == Some(StartPattern::Bracketed)));
    }

    #[test]
    fn test_segment_numbered_and_organization() {
        let text = "1. Smith J. Cancer screening. Lancet, 2019;3:1-5.\nUNESCO Institute for Statistics (2020). Data.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pattern, Some(StartPattern::Numbered));
        assert_eq!(entries[1].pattern, Some(StartPattern::Organization));
    }

    #[test]
    fn test_narrative_line_is_continuation() {
        // Looks like an author-year opener, but starts with "Según".
        let text = "García, J. (2020). Obra principal. Editorial.\nSegún Pérez, M. (2019), el modelo es útil.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].text().ends_with("el modelo es útil."));
    }

    #[test]
    fn test_structural_match_without_year_is_continuation() {
        let text = "García, J. (2020). Obra. Editorial.\nSmith, J. A note without any year here.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines().len(), 2);
    }

    #[test]
    fn test_leading_continuation_forms_own_candidate() {
        let text = "texto suelto antes de la lista\nGarcía, J. (2020). Obra. Editorial.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pattern, None);
        assert_eq!(entries[1].pattern, Some(StartPattern::AuthorInitial));
    }

    #[test]
    fn test_trailing_marker_halts() {
        let text = "García, J. (2020). Obra. Editorial.\nANEXO 1\nPérez, M. (2019). Otra. Editorial.\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].text().contains("ANEXO"));
    }

    #[test]
    fn test_blank_lines_and_indentation_ignored() {
        let text = "\n\n   García, J. (2020). Obra.\n\n      continúa aquí.  \n\n";
        let entries = segment(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), "García, J. (2020). Obra. continúa aquí.");
    }

    #[test]
    fn test_order_preserved() {
        let openers = [
            "Alonso, A. (2010). Uno.",
            "Benítez, B. (2011). Dos.",
            "Castro, C. (2012). Tres.",
            "Díaz, D. (2013). Cuatro.",
        ];
        let text = openers
            .iter()
            .map(|o| format!("{o}\nlínea de continuación"))
            .collect::<Vec<_>>()
            .join("\n");
        let entries = segment(&text);
        assert_eq!(entries.len(), openers.len());
        for (entry, opener) in entries.iter().zip(openers) {
            assert_eq!(entry.first_line(), opener);
        }
    }

    #[test]
    fn test_finalize_normalizes_whitespace() {
        let entries = segment("García,  J.  (2020).   Obra.\n  fin.");
        let entry = entries.into_iter().next().unwrap().finalize();
        assert_eq!(entry.as_str(), "García, J. (2020). Obra. fin.");
    }
}
