use thiserror::Error;

pub mod analyze;
pub mod docx;
pub mod extractor;
pub mod plain;

pub use analyze::{Analysis, analyze_file};
pub use docx::DocxBackend;
pub use extractor::TextExtractor;
pub use plain::PlainTextBackend;
// Re-export domain types for convenience
pub use normcheck_core::{BackendError, DocumentBackend, Norm, NormResult};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Formato no soportado: {0}")]
    UnsupportedFormat(String),
    #[error("text extraction failed: {0}")]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("extraction task failed: {0}")]
    Task(String),
    #[error("analysis cancelled")]
    Cancelled,
}
