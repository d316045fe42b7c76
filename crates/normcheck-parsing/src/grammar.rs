use once_cell::sync::Lazy;
use regex::Regex;

use normcheck_core::{CitationVerdict, EvaluationIssue, Norm};

/// `(Surname, YYYY)`, `(Surname & Surname2, YYYY)`, `(Surname y Surname2, YYYY)`,
/// `(Surname et al., YYYY)`, `(Surname y otros, YYYY)`.
static APA_CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\((\p{Lu}[\p{L}'’\-]+)(?:\s+(?:&|y)\s+(\p{Lu}[\p{L}'’\-]+)|\s+et\s+al\.|\s+y\s+otros)?,\s*\d{4}\)$",
    )
    .unwrap()
});

/// `[3]`, `[3-5]`, `[1, 4]`, `[1, 3-5, 9]`.
static IEEE_CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[\d+(?:\s*[-–]\s*\d+)?(?:\s*,\s*\d+(?:\s*[-–]\s*\d+)?)*\]$").unwrap()
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)\d{4}(?:\D|$)").unwrap());
static CAPITALIZED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Lu}\p{L}+").unwrap());
static COMMA_BEFORE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\d{4}").unwrap());

const REASON_NO_PARENS: &str = "No está entre paréntesis";
const REASON_NO_YEAR: &str = "No contiene un año de 4 dígitos";
const REASON_NO_SURNAME: &str = "No contiene un apellido que comience con mayúscula";
const REASON_NO_COMMA: &str = "Falta la coma entre el autor y el año";
const REASON_APA_GENERIC: &str = "Formato de cita APA no reconocido";
const REASON_IEEE: &str = "No sigue el formato IEEE de número entre corchetes, p. ej. [1]";

/// Check one citation token against the grammar of `norm`.
pub fn validate_citation(norm: Norm, token: &str) -> CitationVerdict {
    let token = token.trim();
    let outcome = match norm {
        Norm::Apa => check_apa(token),
        Norm::Ieee => check_ieee(token),
    };
    match outcome {
        Ok(()) => CitationVerdict::valid(token),
        Err(issue) => CitationVerdict::invalid(token, issue.to_string()),
    }
}

fn check_apa(token: &str) -> Result<(), EvaluationIssue> {
    if APA_CITATION_RE.is_match(token) {
        return Ok(());
    }

    // Each check runs independently; every failure is reported.
    let mut reasons = Vec::new();
    if !(token.starts_with('(') && token.ends_with(')')) {
        reasons.push(REASON_NO_PARENS);
    }
    if !YEAR_RE.is_match(token) {
        reasons.push(REASON_NO_YEAR);
    }
    if !CAPITALIZED_RE.is_match(token) {
        reasons.push(REASON_NO_SURNAME);
    }
    if !COMMA_BEFORE_YEAR_RE.is_match(token) {
        reasons.push(REASON_NO_COMMA);
    }

    let reason = if reasons.is_empty() {
        REASON_APA_GENERIC.to_string()
    } else {
        reasons.join("; ")
    };
    Err(EvaluationIssue::GrammarMismatch { reason })
}

fn check_ieee(token: &str) -> Result<(), EvaluationIssue> {
    if IEEE_CITATION_RE.is_match(token) {
        Ok(())
    } else {
        Err(EvaluationIssue::GrammarMismatch {
            reason: REASON_IEEE.to_string(),
        })
    }
}
