use once_cell::sync::Lazy;
use regex::Regex;

use normcheck_core::config_file::ParsingOverrides;

use crate::ParsingError;

/// Headings that open the bibliography section (matched case-insensitively).
pub(crate) const DEFAULT_HEADING_TOKENS: &[&str] = &[
    "REFERENCIAS",
    "BIBLIOGRAFÍA",
    "BIBLIOGRAFIA",
    "REFERENCES",
    "BIBLIOGRAPHY",
];

/// Line-leading markers of the section that follows the bibliography.
pub(crate) const DEFAULT_TRAILING_MARKERS: &[&str] = &[
    "ANEXOS",
    "ANEXO",
    "APÉNDICES",
    "APÉNDICE",
    "APENDICE",
    "APPENDIX",
    "ANNEX",
    "FIRMA",
    "AUTOR(ES):",
    "TUTOR",
];

/// Sentence openers that mark body prose, never a reference.
pub(crate) const DEFAULT_NARRATIVE_PREFIXES: &[&str] = &[
    "En el",
    "En la",
    "En los",
    "En las",
    "En este",
    "En esta",
    "En cuanto",
    "En conclusión",
    "El uso",
    "El presente",
    "El objetivo",
    "La necesidad",
    "La presente",
    "Los resultados",
    "Las herramientas",
    "Según",
    "De acuerdo con",
    "Además",
    "Asimismo",
    "Sin embargo",
    "No obstante",
    "Por otro lado",
    "Por otra parte",
    "Por lo tanto",
    "Por ello",
    "Por consiguiente",
    "Es decir",
    "Es importante",
    "Cabe destacar",
    "Finalmente",
    "Actualmente",
    "Este trabajo",
    "Esta investigación",
    "Dicho",
    "Para ello",
];

/// Phrases diagnostic of body text accidentally captured as an entry.
pub(crate) const DEFAULT_NARRATIVE_PHRASES: &[&str] = &[
    "se ha convertido en",
    "han demostrado que",
    "ha demostrado que",
    "la implementación de",
    "es importante destacar",
    "cabe mencionar",
    "en la actualidad",
    "el presente trabajo",
    "esta investigación",
    "se puede observar",
    "permite mejorar",
    "con el fin de",
];

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }

    fn push(&mut self, value: T) {
        match self {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
            ListOverride::Default => *self = ListOverride::Extend(vec![value]),
        }
    }
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Immutable configuration shared by every pipeline component.
///
/// Word lists are resolved and the heading/marker regexes compiled once in
/// [`ParsingConfigBuilder::build`]; components only read from it, so one
/// config can serve any number of concurrent analyses.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── section locator ──
    pub(crate) heading_re: Regex,
    /// Anchored at line start (multi-line mode).
    pub(crate) trailing_re: Regex,

    // ── segmenter / validator ──
    /// Stored lowercased; compared against lowercased text.
    pub(crate) narrative_prefixes: Vec<String>,
    pub(crate) narrative_phrases: Vec<String>,
    pub(crate) min_entry_chars: usize,
    pub(crate) min_punctuation: usize,
    pub(crate) min_year: u32,
    pub(crate) max_year: u32,

    // ── classifier ──
    pub(crate) classifier_sample: usize,
}

static DEFAULT_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| heading_regex(&owned(DEFAULT_HEADING_TOKENS)).unwrap());
static DEFAULT_TRAILING_RE: Lazy<Regex> =
    Lazy::new(|| trailing_regex(&owned(DEFAULT_TRAILING_MARKERS)).unwrap());

impl Default for ParsingConfig {
    fn default() -> Self {
        let lower =
            |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_lowercase()).collect() };
        Self {
            heading_re: DEFAULT_HEADING_RE.clone(),
            trailing_re: DEFAULT_TRAILING_RE.clone(),
            narrative_prefixes: lower(DEFAULT_NARRATIVE_PREFIXES),
            narrative_phrases: lower(DEFAULT_NARRATIVE_PHRASES),
            min_entry_chars: 30,
            min_punctuation: 2,
            min_year: 1900,
            max_year: 2099,
            classifier_sample: 15,
        }
    }
}

impl ParsingConfig {
    /// Maximum number of entries (and, separately, inline markers) the
    /// style classifier looks at.
    pub fn classifier_sample(&self) -> usize {
        self.classifier_sample
    }

    pub fn min_entry_chars(&self) -> usize {
        self.min_entry_chars
    }

    /// Whether `text` opens with a narrative-prose prefix.
    ///
    /// The prefix must end at a word boundary, so "En el" does not claim
    /// "En ella" but does claim "En el año".
    pub(crate) fn has_narrative_prefix(&self, text: &str) -> bool {
        let lower = text.trim_start().to_lowercase();
        self.narrative_prefixes.iter().any(|prefix| {
            lower.starts_with(prefix.as_str())
                && !lower[prefix.len()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric)
        })
    }

    /// Whether `text` contains a phrase typical of body prose.
    pub(crate) fn has_narrative_phrase(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.narrative_phrases
            .iter()
            .any(|phrase| lower.contains(phrase.as_str()))
    }

    /// Whether `line` opens a trailing section (annex, signature, ...).
    pub(crate) fn is_trailing_marker(&self, line: &str) -> bool {
        self.trailing_re
            .find(line)
            .is_some_and(|m| m.start() == 0)
    }
}

/// Build an alternation where word-like token edges get `\b` guards.
///
/// Tokens ending in punctuation (e.g. `AUTOR(ES):`) are left unguarded on
/// that side, since `\b` there would demand a following word character.
fn token_alternation(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            let lead = t.chars().next().is_some_and(char::is_alphanumeric);
            let tail = t.chars().last().is_some_and(char::is_alphanumeric);
            format!(
                "{}{}{}",
                if lead { r"\b" } else { "" },
                regex::escape(t),
                if tail { r"\b" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn heading_regex(tokens: &[String]) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i)(?:{})", token_alternation(tokens)))
}

fn trailing_regex(markers: &[String]) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?im)^[ \t]*(?:{})", token_alternation(markers)))
}

/// Builder for [`ParsingConfig`].
///
/// Word lists default to the built-in Spanish/English vocabulary and can be
/// replaced or extended. Fails fast in [`build()`](Self::build) if a list
/// ends up empty or a pattern does not compile.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    heading_tokens: ListOverride<String>,
    trailing_markers: ListOverride<String>,
    narrative_prefixes: ListOverride<String>,
    narrative_phrases: ListOverride<String>,
    min_entry_chars: Option<usize>,
    min_punctuation: Option<usize>,
    year_range: Option<(u32, u32)>,
    classifier_sample: Option<usize>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Section headings / trailing markers ──

    pub fn set_heading_tokens(mut self, tokens: Vec<String>) -> Self {
        self.heading_tokens = ListOverride::Replace(tokens);
        self
    }

    pub fn add_heading_token(mut self, token: String) -> Self {
        self.heading_tokens.push(token);
        self
    }

    pub fn set_trailing_markers(mut self, markers: Vec<String>) -> Self {
        self.trailing_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_trailing_marker(mut self, marker: String) -> Self {
        self.trailing_markers.push(marker);
        self
    }

    // ── Narrative filters ──

    pub fn set_narrative_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.narrative_prefixes = ListOverride::Replace(prefixes);
        self
    }

    pub fn add_narrative_prefix(mut self, prefix: String) -> Self {
        self.narrative_prefixes.push(prefix);
        self
    }

    pub fn set_narrative_phrases(mut self, phrases: Vec<String>) -> Self {
        self.narrative_phrases = ListOverride::Replace(phrases);
        self
    }

    pub fn add_narrative_phrase(mut self, phrase: String) -> Self {
        self.narrative_phrases.push(phrase);
        self
    }

    // ── Scalars ──

    pub fn min_entry_chars(mut self, n: usize) -> Self {
        self.min_entry_chars = Some(n);
        self
    }

    pub fn min_punctuation(mut self, n: usize) -> Self {
        self.min_punctuation = Some(n);
        self
    }

    pub fn year_range(mut self, min: u32, max: u32) -> Self {
        self.year_range = Some((min, max));
        self
    }

    pub fn classifier_sample(mut self, n: usize) -> Self {
        self.classifier_sample = Some(n);
        self
    }

    /// Apply the `[parsing]` section of a config file: extra tokens extend
    /// the defaults, scalars replace them.
    pub fn apply_overrides(mut self, overrides: &ParsingOverrides) -> Self {
        for token in overrides.extra_heading_tokens.iter().flatten() {
            self.heading_tokens.push(token.clone());
        }
        for marker in overrides.extra_trailing_markers.iter().flatten() {
            self.trailing_markers.push(marker.clone());
        }
        for prefix in overrides.extra_narrative_prefixes.iter().flatten() {
            self.narrative_prefixes.push(prefix.clone());
        }
        if let Some(n) = overrides.classifier_sample {
            self.classifier_sample = Some(n);
        }
        self
    }

    /// Resolve word lists and compile the section regexes.
    pub fn build(self) -> Result<ParsingConfig, ParsingError> {
        let defaults = ParsingConfig::default();

        let headings = self.heading_tokens.resolve(&owned(DEFAULT_HEADING_TOKENS));
        if headings.iter().all(|t| t.trim().is_empty()) {
            return Err(ParsingError::EmptyList("heading tokens"));
        }
        let markers = self
            .trailing_markers
            .resolve(&owned(DEFAULT_TRAILING_MARKERS));
        if markers.iter().all(|t| t.trim().is_empty()) {
            return Err(ParsingError::EmptyList("trailing markers"));
        }

        let lowered = |list: Vec<String>| -> Vec<String> {
            list.into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let (min_year, max_year) = self
            .year_range
            .unwrap_or((defaults.min_year, defaults.max_year));
        if min_year > max_year {
            return Err(ParsingError::InvalidYearRange(min_year, max_year));
        }

        Ok(ParsingConfig {
            heading_re: heading_regex(&headings)?,
            trailing_re: trailing_regex(&markers)?,
            narrative_prefixes: lowered(
                self.narrative_prefixes
                    .resolve(&owned(DEFAULT_NARRATIVE_PREFIXES)),
            ),
            narrative_phrases: lowered(
                self.narrative_phrases
                    .resolve(&owned(DEFAULT_NARRATIVE_PHRASES)),
            ),
            min_entry_chars: self.min_entry_chars.unwrap_or(defaults.min_entry_chars),
            min_punctuation: self.min_punctuation.unwrap_or(defaults.min_punctuation),
            min_year,
            max_year,
            classifier_sample: self
                .classifier_sample
                .unwrap_or(defaults.classifier_sample)
                .max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.min_entry_chars, 30);
        assert_eq!(config.min_punctuation, 2);
        assert_eq!(config.classifier_sample, 15);
        assert_eq!((config.min_year, config.max_year), (1900, 2099));
        assert!(config.narrative_prefixes.contains(&"según".to_string()));
    }

    #[test]
    fn test_builder_scalars() {
        let config = ParsingConfigBuilder::new()
            .min_entry_chars(10)
            .classifier_sample(20)
            .year_range(1800, 2100)
            .build()
            .unwrap();
        assert_eq!(config.min_entry_chars, 10);
        assert_eq!(config.classifier_sample, 20);
        assert_eq!(config.min_year, 1800);
    }

    #[test]
    fn test_builder_rejects_inverted_year_range() {
        let result = ParsingConfigBuilder::new().year_range(2100, 1900).build();
        assert!(matches!(result, Err(ParsingError::InvalidYearRange(2100, 1900))));
    }

    #[test]
    fn test_builder_rejects_empty_headings() {
        let result = ParsingConfigBuilder::new()
            .set_heading_tokens(vec!["  ".to_string()])
            .build();
        assert!(matches!(result, Err(ParsingError::EmptyList(_))));
    }

    #[test]
    fn test_heading_tokens_are_escaped() {
        // Regex metacharacters in a token are matched literally.
        let config = ParsingConfigBuilder::new()
            .set_heading_tokens(vec!["OBRAS (CITADAS)".to_string()])
            .build()
            .unwrap();
        assert!(config.heading_re.is_match("obras (citadas)"));
        assert!(!config.heading_re.is_match("OBRAS CITADAS"));
    }

    #[test]
    fn test_trailing_marker_with_trailing_punctuation() {
        let config = ParsingConfig::default();
        assert!(config.trailing_re.is_match("AUTOR(ES): Juan Pérez"));
        assert!(config.trailing_re.is_match("  Anexo A. Encuesta"));
        assert!(!config.trailing_re.is_match("TUTORIAL de uso"));
        assert!(!config.trailing_re.is_match("Ver el anexo A"));
    }

    #[test]
    fn test_narrative_prefix_respects_word_boundary() {
        let config = ParsingConfig::default();
        assert!(config.has_narrative_prefix("En el año 2020 se implementó"));
        assert!(config.has_narrative_prefix("SEGÚN los autores"));
        assert!(!config.has_narrative_prefix("En ella se describe"));
        assert!(!config.has_narrative_prefix("Elsevier (2020). Manual."));
    }

    #[test]
    fn test_narrative_phrase_is_case_insensitive() {
        let config = ParsingConfig::default();
        assert!(config.has_narrative_phrase("La IA Se Ha Convertido En un pilar"));
        assert!(!config.has_narrative_phrase("Smith, J. (2020). Deep learning."));
    }

    #[test]
    fn test_apply_file_overrides() {
        let overrides = ParsingOverrides {
            extra_heading_tokens: Some(vec!["Obras citadas".to_string()]),
            extra_trailing_markers: None,
            extra_narrative_prefixes: Some(vec!["Cabe señalar".to_string()]),
            classifier_sample: Some(30),
        };
        let config = ParsingConfigBuilder::new()
            .apply_overrides(&overrides)
            .build()
            .unwrap();
        assert!(config.heading_re.is_match("OBRAS CITADAS"));
        assert!(config.heading_re.is_match("Referencias"));
        assert!(config.has_narrative_prefix("Cabe señalar que en 2020"));
        assert_eq!(config.classifier_sample, 30);
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let mut e: ListOverride<String> = ListOverride::Default;
        e.push("c".to_string());
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
