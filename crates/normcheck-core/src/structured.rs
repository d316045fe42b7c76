//! Contract for the external structured-parse collaborator.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Whether the collaborator produced a usable parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    Success,
    Error,
}

/// Labelled bibliographic fields for one reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReference {
    pub authors: Vec<String>,
    pub year: Option<String>,
    pub title: Option<String>,
}

impl StructuredReference {
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.year.is_none() && self.title.is_none()
    }
}

/// Result of a structured parse of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredParse {
    pub status: ParseStatus,
    pub references: Vec<StructuredReference>,
    /// Raw inline citation markers, in document order.
    pub inline_citations: Vec<String>,
    /// Failure detail when `status` is `Error`.
    pub error: Option<String>,
}

impl StructuredParse {
    pub fn success(references: Vec<StructuredReference>, inline_citations: Vec<String>) -> Self {
        Self {
            status: ParseStatus::Success,
            references,
            inline_citations,
            error: None,
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            status: ParseStatus::Error,
            references: Vec::new(),
            inline_citations: Vec::new(),
            error: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ParseStatus::Success
    }
}

/// A service that converts document bytes into labelled bibliographic data.
///
/// Failures are reported through [`StructuredParse::error`], never panics or
/// transport errors; retries, if any, belong to the implementor.
pub trait StructuredParser: Send + Sync {
    /// Display name used in logs (e.g. "GROBID").
    fn name(&self) -> &str;

    /// Parse one document. `file_name` is passed through for services that
    /// dispatch on it.
    fn parse<'a>(
        &'a self,
        file_name: &'a str,
        document: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = StructuredParse> + Send + 'a>>;
}
