use std::path::PathBuf;
use std::sync::Arc;

use normcheck_core::StructuredParser;
use normcheck_ingest::TextExtractor;
use normcheck_parsing::NormAnalyzer;
use tokio_util::sync::CancellationToken;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub extractor: TextExtractor,
    pub parser: Arc<dyn StructuredParser>,
    pub analyzer: NormAnalyzer,
    pub reports_dir: PathBuf,
    /// Cancelled on shutdown; in-flight analyses stop waiting on GROBID.
    pub shutdown: CancellationToken,
}
