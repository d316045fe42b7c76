//! Word (`.docx`) text extraction.
//!
//! A DOCX file is a ZIP container; the body lives in `word/document.xml`.
//! Each `<w:p>` paragraph becomes one line, `<w:tab/>` a tab and
//! `<w:br/>` / `<w:cr/>` a line break. Only `<w:t>` runs contribute text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use normcheck_core::{BackendError, DocumentBackend};

const DOCUMENT_XML: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxBackend;

impl DocumentBackend for DocxBackend {
    /// Legacy binary `.doc` is routed here too; such files are not ZIP
    /// containers and fail with an open error.
    fn extensions(&self) -> &[&'static str] {
        &["docx", "doc"]
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            BackendError::OpenError(format!("not a valid DOCX (ZIP) container: {e}"))
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_XML)
            .map_err(|e| BackendError::OpenError(format!("{DOCUMENT_XML} missing: {e}")))?
            .read_to_string(&mut xml)?;

        let text = document_text(&xml)?;
        tracing::debug!(chars = text.len(), path = %path.display(), "extracted DOCX text");
        Ok(text)
    }
}

/// Flatten `word/document.xml` into plain text, one paragraph per line.
pub fn document_text(xml: &str) -> Result<String, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut in_text_run = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" | b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text_run => {
                let text = e
                    .unescape()
                    .map_err(|err| BackendError::ExtractionError(err.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(BackendError::ExtractionError(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
