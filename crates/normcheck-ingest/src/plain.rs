use std::path::Path;

use normcheck_core::{BackendError, DocumentBackend};

/// Reads `.txt` files as UTF-8, replacing invalid sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextBackend;

impl DocumentBackend for PlainTextBackend {
    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
    }
}
