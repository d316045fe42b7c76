use std::path::Path;

use mupdf::{Document, Page, Rect, TextPageFlags};

use normcheck_core::text_utils::normalize_extracted;
use normcheck_core::{BackendError, DocumentBackend};

/// MuPDF-based implementation of [`DocumentBackend`] for `.pdf` files.
///
/// Kept in its own crate so that only builds with PDF support link the
/// AGPL-licensed mupdf library.
///
/// Running headers and page-number footers of theses would otherwise be
/// glued into whichever reference spans the page break, so blocks in the
/// top `header_ratio` and bottom `footer_ratio` of each page are dropped.
pub struct MupdfBackend {
    header_ratio: f32,
    footer_ratio: f32,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            header_ratio: 0.04,
            footer_ratio: 0.05,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every block, including running headers and footers.
    pub fn full_page() -> Self {
        Self {
            header_ratio: 0.0,
            footer_ratio: 0.0,
        }
    }

    /// Fraction of page height, from the top, treated as running header.
    pub fn with_header_ratio(mut self, ratio: f32) -> Self {
        self.header_ratio = ratio.clamp(0.0, 0.5);
        self
    }

    /// Fraction of page height, from the bottom, treated as footer.
    pub fn with_footer_ratio(mut self, ratio: f32) -> Self {
        self.footer_ratio = ratio.clamp(0.0, 0.5);
        self
    }

    /// Vertical band of `bounds` whose blocks are kept.
    fn body_band(&self, bounds: &Rect) -> (f32, f32) {
        let height = bounds.y1 - bounds.y0;
        (
            bounds.y0 + height * self.header_ratio,
            bounds.y1 - height * self.footer_ratio,
        )
    }

    fn page_text(&self, page: &Page) -> Result<String, BackendError> {
        let bounds = page.bounds().map_err(extraction)?;
        let (top, bottom) = self.body_band(&bounds);
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(extraction)?;

        let mut text = String::new();
        for block in text_page.blocks() {
            let b = block.bounds();
            if (self.header_ratio > 0.0 && b.y1 <= top)
                || (self.footer_ratio > 0.0 && b.y0 >= bottom)
            {
                continue;
            }
            for line in block.lines() {
                text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                text.push('\n');
            }
        }
        Ok(text)
    }
}

fn extraction(e: mupdf::Error) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

impl DocumentBackend for MupdfBackend {
    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();
        for page in document.pages().map_err(extraction)? {
            pages.push(self.page_text(&page.map_err(extraction)?)?);
        }
        tracing::debug!(pages = pages.len(), path = %path.display(), "extracted PDF text");

        Ok(normalize_extracted(&pages.join("\n")))
    }
}
