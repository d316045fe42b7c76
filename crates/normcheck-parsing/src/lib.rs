use thiserror::Error;

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod evaluate;
pub mod grammar;
pub mod section;
pub mod segment;
pub mod validate;

pub use analyzer::NormAnalyzer;
pub use classify::{classify_entry, classify_marker, classify_style};
pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use evaluate::{evaluate, extract_entries};
pub use grammar::validate_citation;
pub use section::{SectionSpan, find_references_section, locate_section};
pub use segment::{CandidateEntry, LineKind, StartPattern, segment_entries};
pub use validate::{RejectReason, check_entry, dedup_entries, is_bibliographic_entry};
// Re-export domain types from core (canonical definitions live there)
pub use normcheck_core::{
    CitationStyle, CitationVerdict, Confidence, Norm, NormResult, ReferenceEntry,
    StructuredParse, StyleClassification,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("{0} list must not be empty")]
    EmptyList(&'static str),
    #[error("invalid year range {0}..={1}")]
    InvalidYearRange(u32, u32),
}
