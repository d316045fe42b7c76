//! Norm evaluation: composes the locator, segmenter, validator, classifier
//! and grammar validator into one verdict per document.

use normcheck_core::{
    CitationVerdict, EvaluationIssue, Norm, NormResult, ReferenceEntry, StructuredParse,
    StyleClassification,
};

use crate::classify::classify_style;
use crate::config::ParsingConfig;
use crate::grammar::validate_citation;
use crate::section::locate_section;
use crate::segment::segment_entries;
use crate::validate::{dedup_entries, is_bibliographic_entry};

/// Run locate → segment → validate → dedup over raw document text.
///
/// Returns an empty list when no bibliography heading is found.
pub fn extract_entries(text: &str, config: &ParsingConfig) -> Vec<ReferenceEntry> {
    let Some(span) = locate_section(text, config) else {
        tracing::debug!("no bibliography section found");
        return Vec::new();
    };

    let candidates = segment_entries(span.slice(text), config);
    let candidate_count = candidates.len();

    let accepted: Vec<ReferenceEntry> = candidates
        .into_iter()
        .map(|c| c.finalize())
        .filter(|entry| is_bibliographic_entry(entry.as_str(), config))
        .collect();

    let entries = dedup_entries(accepted);
    tracing::debug!(
        candidates = candidate_count,
        accepted = entries.len(),
        "extracted reference entries"
    );
    entries
}

/// Evaluate a document against a citation norm.
///
/// Never fails: a blank document or an unusable structured parse yield a
/// non-compliant result carrying a single error. When `requested_norm` is
/// `None` the norm is picked from the detected style.
pub fn evaluate(
    text: &str,
    requested_norm: Option<Norm>,
    structured: &StructuredParse,
    config: &ParsingConfig,
) -> NormResult {
    if text.trim().is_empty() {
        return NormResult::terminal(
            requested_norm.unwrap_or(Norm::Apa),
            &EvaluationIssue::InputEmpty,
        );
    }

    if !structured.is_success() {
        let detail = structured.error.clone().unwrap_or_default();
        tracing::warn!(detail = detail.as_str(), "structured parse unavailable");
        return NormResult::terminal(
            requested_norm.unwrap_or(Norm::Apa),
            &EvaluationIssue::UpstreamParseUnavailable { detail },
        );
    }

    let entries = extract_entries(text, config);
    let classification = classify_style(&entries, &structured.inline_citations, config);
    let norm = requested_norm.unwrap_or_else(|| Norm::from_style(classification.style));

    aggregate(norm, entries, classification, &structured.inline_citations)
}

fn aggregate(
    norm: Norm,
    entries: Vec<ReferenceEntry>,
    classification: StyleClassification,
    inline_markers: &[String],
) -> NormResult {
    let total_citations = entries.len();

    // Entries that survived validation are accepted as reference text; the
    // grammar check is reserved for inline markers.
    let valid_citations: Vec<CitationVerdict> = match norm {
        Norm::Apa => entries
            .into_iter()
            .map(|e| CitationVerdict::valid(e.into_string()))
            .collect(),
        Norm::Ieee => entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| CitationVerdict::valid(format!("[{}] {}", i + 1, e)))
            .collect(),
    };

    let mut errors = Vec::new();
    if valid_citations.is_empty() {
        errors.push(EvaluationIssue::NoReferencesDetected.to_string());
    }

    let inline_citations: Vec<CitationVerdict> = inline_markers
        .iter()
        .filter(|m| !m.trim().is_empty())
        .map(|m| validate_citation(norm, m))
        .collect();

    let summary = summarize(norm, total_citations, &classification, &inline_citations);
    let compliant = errors.is_empty();

    tracing::info!(
        norm = norm.as_str(),
        compliant,
        total = total_citations,
        inline = inline_citations.len(),
        "evaluation finished"
    );

    NormResult {
        norm,
        compliant,
        errors,
        valid_citations,
        invalid_citations: Vec::new(),
        total_citations,
        detected_style: Some(classification),
        summary,
        inline_citations,
    }
}

fn summarize(
    norm: Norm,
    total: usize,
    classification: &StyleClassification,
    inline: &[CitationVerdict],
) -> String {
    let mut summary = format!(
        "Norma {}: {} referencias detectadas. Estilo predominante: {} (confianza {}).",
        norm.label(),
        total,
        classification.style,
        classification.confidence
    );
    if !inline.is_empty() {
        let valid = inline.iter().filter(|v| v.is_valid).count();
        summary.push_str(&format!(
            " Citas en el texto: {} de {} con formato {} correcto.",
            valid,
            inline.len(),
            norm.label()
        ));
    }
    summary
}
