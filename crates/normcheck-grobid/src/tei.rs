//! Extraction of references and inline citation markers from GROBID TEI.
//!
//! Uses SAX-style event processing. Only the handful of elements the
//! analysis needs are tracked:
//!
//! - `<biblStruct>`: one reference; surnames come from `<persName><surname>`,
//!   the year from the `when` attribute of `<date>`, the title from the first
//!   `<title level="a">`.
//! - `<ref type="bibr">`: one inline citation marker in the body.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use normcheck_core::StructuredReference;

use crate::GrobidError;

/// References and inline markers found in one TEI document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TeiDocument {
    pub references: Vec<StructuredReference>,
    pub inline_citations: Vec<String>,
}

/// Which element we're currently reading text for.
enum Field {
    Surname,
    Title,
    Ref,
}

impl Field {
    fn element_name(&self) -> &[u8] {
        match self {
            Field::Surname => b"surname",
            Field::Title => b"title",
            Field::Ref => b"ref",
        }
    }
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// `when="2020-05-01"` → `2020`; anything without a leading 4-digit year is
/// ignored.
fn year_from_when(when: &str) -> Option<String> {
    let year: String = when.chars().take(4).collect();
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then_some(year)
}

/// Collapse internal whitespace; `None` for blank text.
fn clean(text: &str) -> Option<String> {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Parse a TEI document produced by `processFulltextDocument`.
pub fn parse_tei(xml: &str) -> Result<TeiDocument, GrobidError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut doc = TeiDocument::default();
    let mut buf = Vec::new();

    let mut current: Option<StructuredReference> = None;
    let mut in_pers_name = false;
    let mut reading: Option<Field> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"biblStruct" => current = Some(StructuredReference::default()),
                    b"persName" if current.is_some() => in_pers_name = true,
                    b"surname" if in_pers_name && reading.is_none() => {
                        reading = Some(Field::Surname);
                        text_buf.clear();
                    }
                    b"title" if reading.is_none() => {
                        let wants_title = current.as_ref().is_some_and(|r| r.title.is_none());
                        if wants_title && attr_value(e, b"level").as_deref() == Some("a") {
                            reading = Some(Field::Title);
                            text_buf.clear();
                        }
                    }
                    b"date" => set_year(current.as_mut(), e),
                    b"ref" if reading.is_none() => {
                        if attr_value(e, b"type").as_deref() == Some("bibr") {
                            reading = Some(Field::Ref);
                            text_buf.clear();
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"date" {
                    set_year(current.as_mut(), e);
                }
            }
            Ok(Event::Text(ref e)) => {
                if reading.is_some() {
                    let text = e
                        .unescape()
                        .map_err(|err| GrobidError::Xml(err.to_string()))?;
                    text_buf.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if reading.is_some() {
                    text_buf.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) => {
                let local = e.local_name();
                let name = local.as_ref();

                if reading.as_ref().is_some_and(|f| f.element_name() == name) {
                    let text = clean(&text_buf);
                    match reading.take() {
                        Some(Field::Surname) => {
                            if let (Some(r), Some(t)) = (current.as_mut(), text) {
                                r.authors.push(t);
                            }
                        }
                        Some(Field::Title) => {
                            if let Some(r) = current.as_mut() {
                                r.title = text;
                            }
                        }
                        Some(Field::Ref) => doc.inline_citations.extend(text),
                        None => {}
                    }
                    text_buf.clear();
                }

                match name {
                    b"persName" => in_pers_name = false,
                    b"biblStruct" => {
                        if let Some(r) = current.take().filter(|r| !r.is_empty()) {
                            doc.references.push(r);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GrobidError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    tracing::debug!(
        references = doc.references.len(),
        inline = doc.inline_citations.len(),
        "parsed TEI document"
    );
    Ok(doc)
}

fn set_year(current: Option<&mut StructuredReference>, e: &BytesStart<'_>) {
    let Some(r) = current else { return };
    if r.year.is_some() {
        return;
    }
    r.year = attr_value(e, b"when").as_deref().and_then(year_from_when);
}
