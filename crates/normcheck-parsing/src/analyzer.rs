use normcheck_core::{
    CitationVerdict, Norm, NormResult, ReferenceEntry, StructuredParse, StyleClassification,
};

use crate::config::ParsingConfig;
use crate::section::SectionSpan;
use crate::segment::CandidateEntry;
use crate::{classify, evaluate, grammar, section, segment};

/// A configurable citation-norm analysis pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`NormAnalyzer::with_config`] to supply custom word lists and thresholds.
/// The analyzer only reads its config, so one instance can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct NormAnalyzer {
    config: ParsingConfig,
}

impl Default for NormAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl NormAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an analyzer with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Locate the bibliography section (step 1).
    pub fn locate_section(&self, text: &str) -> Option<SectionSpan> {
        section::locate_section(text, &self.config)
    }

    /// Split a bibliography section into candidate entries (step 2).
    pub fn segment(&self, section: &str) -> Vec<CandidateEntry> {
        segment::segment_entries(section, &self.config)
    }

    /// Locate, segment, validate and deduplicate (steps 1–3).
    pub fn extract_entries(&self, text: &str) -> Vec<ReferenceEntry> {
        evaluate::extract_entries(text, &self.config)
    }

    /// Infer the dominant citation style (step 4).
    pub fn classify(&self, entries: &[ReferenceEntry], markers: &[String]) -> StyleClassification {
        classify::classify_style(entries, markers, &self.config)
    }

    /// Check one citation token against a norm's grammar (step 5).
    pub fn check_citation(&self, norm: Norm, token: &str) -> CitationVerdict {
        grammar::validate_citation(norm, token)
    }

    /// Evaluate a whole document (step 6).
    pub fn evaluate(
        &self,
        text: &str,
        requested_norm: Option<Norm>,
        structured: &StructuredParse,
    ) -> NormResult {
        evaluate::evaluate(text, requested_norm, structured, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use normcheck_core::CitationStyle;

    const DOC: &str = "Cuerpo del trabajo.\nBibliografía\n\
Alonso, A. (2010). Fundamentos de redes neuronales. Editorial Norte.\n\
Benítez, B. (2012). Sistemas expertos en la industria. Revista Técnica, 3(1), 5-9.\n\
Anexo 1\nCuestionario aplicado en 2021, versión final.\n";

    #[test]
    fn test_steps_compose() {
        let analyzer = NormAnalyzer::new();
        let span = analyzer.locate_section(DOC).unwrap();
        let candidates = analyzer.segment(span.slice(DOC));
        assert_eq!(candidates.len(), 2);

        let entries = analyzer.extract_entries(DOC);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.as_str().contains("Cuestionario")));

        let style = analyzer.classify(&entries, &[]);
        assert_eq!(style.style, CitationStyle::Apa);
    }

    #[test]
    fn test_with_config_changes_behaviour() {
        let config = ParsingConfigBuilder::new()
            .min_entry_chars(200)
            .build()
            .unwrap();
        let analyzer = NormAnalyzer::with_config(config);
        assert_eq!(analyzer.config().min_entry_chars(), 200);
        assert!(analyzer.extract_entries(DOC).is_empty());
    }

    #[test]
    fn test_check_citation_delegates() {
        let analyzer = NormAnalyzer::default();
        assert!(analyzer.check_citation(Norm::Ieee, "[4]").is_valid);
        assert!(!analyzer.check_citation(Norm::Apa, "[4]").is_valid);
    }

    #[test]
    fn test_evaluate_delegates() {
        let analyzer = NormAnalyzer::new();
        let parse = StructuredParse::success(Vec::new(), Vec::new());
        let result = analyzer.evaluate(DOC, Some(Norm::Apa), &parse);
        assert!(result.compliant);
        assert_eq!(result.total_citations, 2);
    }
}
