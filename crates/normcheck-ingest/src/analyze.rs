use std::path::Path;

use tokio_util::sync::CancellationToken;

use normcheck_core::{Norm, NormResult, StructuredParser};
use normcheck_parsing::NormAnalyzer;

use crate::IngestError;
use crate::extractor::TextExtractor;

/// Result of analysing one document on disk.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub file_name: String,
    /// Characters of extracted text handed to the evaluator.
    pub text_chars: usize,
    pub result: NormResult,
}

/// Extract, parse and evaluate one document.
///
/// Text extraction runs on the blocking pool. The structured parse is
/// awaited exactly once; if `cancel` fires before it completes the document
/// is not evaluated and [`IngestError::Cancelled`] is returned. When
/// `requested_norm` is `None` the norm is inferred from the detected style.
pub async fn analyze_file(
    path: &Path,
    requested_norm: Option<Norm>,
    extractor: &TextExtractor,
    parser: &dyn StructuredParser,
    analyzer: &NormAnalyzer,
    cancel: &CancellationToken,
) -> Result<Analysis, IngestError> {
    if cancel.is_cancelled() {
        return Err(IngestError::Cancelled);
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Fail fast before touching the blocking pool.
    if !extractor.supports(path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        return Err(IngestError::UnsupportedFormat(format!(".{ext}")));
    }

    let text = tokio::select! {
        text = extractor.extract_text_blocking(path) => text?,
        _ = cancel.cancelled() => return Err(IngestError::Cancelled),
    };
    tracing::debug!(file = %file_name, chars = text.chars().count(), "text extracted");

    let bytes = tokio::fs::read(path).await?;

    let structured = tokio::select! {
        parse = parser.parse(&file_name, &bytes) => parse,
        _ = cancel.cancelled() => {
            tracing::debug!(file = %file_name, parser = parser.name(), "analysis cancelled during structured parse");
            return Err(IngestError::Cancelled);
        }
    };

    let result = analyzer.evaluate(&text, requested_norm, &structured);
    tracing::info!(
        file = %file_name,
        norm = result.norm.as_str(),
        compliant = result.compliant,
        total = result.total_citations,
        "document analysed"
    );

    Ok(Analysis {
        file_name,
        text_chars: text.chars().count(),
        result,
    })
}
