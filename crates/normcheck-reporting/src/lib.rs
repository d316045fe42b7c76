use thiserror::Error;

pub mod export;
pub mod text;

pub use export::{export_json, report_file_name, write_text_report};
pub use text::{ReportCounts, parse_report_counts, render_text_report};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed report: {0}")]
    Malformed(String),
}
