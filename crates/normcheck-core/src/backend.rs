use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A text extraction backend for one family of document formats.
///
/// Implementors turn a file on disk into plain UTF-8 text; locating and
/// grading the bibliography happens downstream in `normcheck-parsing`.
pub trait DocumentBackend: Send + Sync {
    /// Lowercase file extensions (without the dot) this backend handles.
    fn extensions(&self) -> &[&'static str];

    /// Extract the full text content of a document.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
