use thiserror::Error;

/// Problems found while evaluating a document against a norm.
///
/// These are recorded in [`crate::NormResult::errors`] (or as invalid
/// verdicts) rather than returned as Rust errors; the `Display` text is the
/// user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationIssue {
    /// Blank or whitespace-only document. Terminal.
    #[error("El documento está vacío")]
    InputEmpty,
    /// The structured-parse collaborator did not report success. Terminal.
    ///
    /// `detail` is kept for logging; the message shown to users is generic.
    #[error("No hay datos estructurados disponibles: el servicio de análisis bibliográfico no respondió correctamente")]
    UpstreamParseUnavailable { detail: String },
    /// No reference entries survived segmentation and validation.
    #[error("No se detectaron referencias bibliográficas")]
    NoReferencesDetected,
    /// A single citation does not follow the norm's grammar.
    #[error("{reason}")]
    GrammarMismatch { reason: String },
}

impl EvaluationIssue {
    /// Whether this issue short-circuits the evaluation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EvaluationIssue::InputEmpty | EvaluationIssue::UpstreamParseUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_detail_is_not_shown() {
        let issue = EvaluationIssue::UpstreamParseUnavailable {
            detail: "connection refused (os error 111)".into(),
        };
        assert!(!issue.to_string().contains("refused"));
        assert!(issue.is_terminal());
    }

    #[test]
    fn grammar_mismatch_displays_reason() {
        let issue = EvaluationIssue::GrammarMismatch {
            reason: "No está entre paréntesis".into(),
        };
        assert_eq!(issue.to_string(), "No está entre paréntesis");
        assert!(!issue.is_terminal());
        assert!(!EvaluationIssue::NoReferencesDetected.is_terminal());
    }
}
