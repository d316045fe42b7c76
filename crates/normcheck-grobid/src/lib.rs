//! GROBID client implementing the structured-parse collaborator.
//!
//! One multipart POST per document to `processFulltextDocument`; the TEI
//! response is reduced to a [`StructuredParse`]. Failures of any kind come
//! back as [`StructuredParse::error`], never as panics. No retries.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use normcheck_core::config_file::{DEFAULT_GROBID_TIMEOUT_SECS, DEFAULT_GROBID_URL};
use normcheck_core::{StructuredParse, StructuredParser};

pub mod tei;

pub use tei::{TeiDocument, parse_tei};

const FULLTEXT_PATH: &str = "/api/processFulltextDocument";

#[derive(Error, Debug)]
pub enum GrobidError {
    #[error("request to GROBID failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Error GROBID: {0}")]
    Status(u16),
    #[error("invalid TEI response: {0}")]
    Xml(String),
    #[error("GROBID solo procesa archivos PDF: {0}")]
    NotPdf(String),
}

fn is_pdf(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".pdf")
}

/// HTTP client for a GROBID server.
pub struct GrobidClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl Default for GrobidClient {
    fn default() -> Self {
        Self::new(DEFAULT_GROBID_URL)
    }
}

impl GrobidClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_GROBID_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send the document and return the raw TEI XML.
    pub async fn process_fulltext(
        &self,
        file_name: &str,
        document: &[u8],
    ) -> Result<String, GrobidError> {
        let part =
            reqwest::multipart::Part::bytes(document.to_vec()).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("input", part);

        let resp = self
            .client
            .post(format!("{}{}", self.base_url, FULLTEXT_PATH))
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GrobidError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }

    /// Send the document and extract references and inline markers.
    pub async fn parse_document(
        &self,
        file_name: &str,
        document: &[u8],
    ) -> Result<TeiDocument, GrobidError> {
        // processFulltextDocument only accepts PDF; skip the upload otherwise.
        if !is_pdf(file_name) {
            return Err(GrobidError::NotPdf(file_name.to_string()));
        }
        let xml = self.process_fulltext(file_name, document).await?;
        parse_tei(&xml)
    }
}

impl StructuredParser for GrobidClient {
    fn name(&self) -> &str {
        "GROBID"
    }

    fn parse<'a>(
        &'a self,
        file_name: &'a str,
        document: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = StructuredParse> + Send + 'a>> {
        Box::pin(async move {
            match self.parse_document(file_name, document).await {
                Ok(doc) => {
                    tracing::debug!(
                        file = file_name,
                        references = doc.references.len(),
                        "GROBID parse succeeded"
                    );
                    StructuredParse::success(doc.references, doc.inline_citations)
                }
                Err(e) => {
                    tracing::warn!(file = file_name, error = %e, "GROBID parse failed");
                    StructuredParse::error(e.to_string())
                }
            }
        })
    }
}
