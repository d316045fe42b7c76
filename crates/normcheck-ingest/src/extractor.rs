use std::path::Path;
use std::sync::Arc;

use normcheck_core::DocumentBackend;

use crate::IngestError;
use crate::docx::DocxBackend;
use crate::plain::PlainTextBackend;

/// Dispatches text extraction to a backend chosen by file extension.
///
/// Backends registered later take precedence over earlier ones for the same
/// extension, so callers can override a default (e.g. swap the PDF backend).
#[derive(Clone, Default)]
pub struct TextExtractor {
    backends: Vec<Arc<dyn DocumentBackend>>,
}

impl TextExtractor {
    /// Extractor with the built-in backends: PDF (with the `pdf` feature),
    /// DOCX/DOC and plain text.
    pub fn new() -> Self {
        let extractor = Self::default()
            .with_backend(Arc::new(PlainTextBackend))
            .with_backend(Arc::new(DocxBackend));
        #[cfg(feature = "pdf")]
        let extractor =
            extractor.with_backend(Arc::new(normcheck_pdf_mupdf::MupdfBackend::default()));
        extractor
    }

    /// Extractor with no backends; every file is unsupported until one is
    /// registered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Arc<dyn DocumentBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Extensions handled by at least one backend, lowercase, without dot.
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<&'static str> = self
            .backends
            .iter()
            .flat_map(|b| b.extensions().iter().copied())
            .collect();
        exts.sort_unstable();
        exts.dedup();
        exts
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.backend_for(&extension_of(path)).is_some()
    }

    fn backend_for(&self, ext: &str) -> Option<&Arc<dyn DocumentBackend>> {
        self.backends
            .iter()
            .rev()
            .find(|b| b.extensions().contains(&ext))
    }

    /// Extract the text of `path` with the backend registered for its
    /// extension.
    pub fn extract_text(&self, path: &Path) -> Result<String, IngestError> {
        let ext = extension_of(path);
        let backend = self
            .backend_for(&ext)
            .ok_or_else(|| IngestError::UnsupportedFormat(format!(".{ext}")))?;
        let text = backend.extract_text(path)?;
        tracing::debug!(ext = ext.as_str(), chars = text.chars().count(), "extracted text");
        Ok(text)
    }

    /// [`Self::extract_text`] on the blocking pool; MuPDF and ZIP reads are
    /// synchronous.
    pub async fn extract_text_blocking(&self, path: &Path) -> Result<String, IngestError> {
        let extractor = self.clone();
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract_text(&owned))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))?
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_core::BackendError;

    struct Fixed(&'static str);

    impl DocumentBackend for Fixed {
        fn extensions(&self) -> &[&'static str] {
            &["txt"]
        }

        fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_default_extensions() {
        let exts = TextExtractor::new().extensions();
        assert!(exts.contains(&"docx"));
        assert!(exts.contains(&"doc"));
        assert!(exts.contains(&"txt"));
        #[cfg(feature = "pdf")]
        assert!(exts.contains(&"pdf"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = TextExtractor::new()
            .extract_text(Path::new("notas.odt"))
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(ref e) if e == ".odt"));
        assert_eq!(err.to_string(), "Formato no soportado: .odt");
    }

    #[test]
    fn test_empty_extractor_supports_nothing() {
        assert!(!TextExtractor::empty().supports(Path::new("a.pdf")));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let extractor = TextExtractor::empty().with_backend(Arc::new(Fixed("hola")));
        assert!(extractor.supports(Path::new("TESIS.TXT")));
        assert_eq!(extractor.extract_text(Path::new("TESIS.TXT")).unwrap(), "hola");
    }

    #[tokio::test]
    async fn test_blocking_extraction_matches_direct() {
        let extractor = TextExtractor::empty().with_backend(Arc::new(Fixed("hola")));
        let text = extractor
            .extract_text_blocking(Path::new("tesis.txt"))
            .await
            .unwrap();
        assert_eq!(text, "hola");

        let err = extractor
            .extract_text_blocking(Path::new("tesis.odt"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(ref e) if e == ".odt"));
    }

    #[test]
    fn test_later_backend_wins() {
        let extractor = TextExtractor::new().with_backend(Arc::new(Fixed("override")));
        let text = extractor.extract_text(Path::new("/nonexistent.txt")).unwrap();
        assert_eq!(text, "override");
    }
}
