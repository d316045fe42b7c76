use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use normcheck_core::ReferenceEntry;

use crate::config::ParsingConfig;

/// Four-digit token not glued to other digits ("12020" has no year).
static YEAR_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)(\d{4})(?:\D|$)").unwrap());

/// Why a candidate was not accepted as a bibliographic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    NoYear,
    TooFewPunctuation,
    NarrativePrefix,
    NarrativePhrase,
}

/// Check a finalized candidate against the bibliographic-entry heuristics.
///
/// Returns the first failed check, or `None` if the text is accepted.
pub fn check_entry(text: &str, config: &ParsingConfig) -> Option<RejectReason> {
    let text = text.trim();

    if text.chars().count() < config.min_entry_chars {
        return Some(RejectReason::TooShort);
    }
    if !has_year_in_range(text, config) {
        return Some(RejectReason::NoYear);
    }
    let punctuation = text.chars().filter(|c| matches!(c, '.' | ',')).count();
    if punctuation < config.min_punctuation {
        return Some(RejectReason::TooFewPunctuation);
    }
    if config.has_narrative_prefix(text) {
        return Some(RejectReason::NarrativePrefix);
    }
    if config.has_narrative_phrase(text) {
        return Some(RejectReason::NarrativePhrase);
    }
    None
}

/// Whether `text` looks like a real reference rather than captured prose.
pub fn is_bibliographic_entry(text: &str, config: &ParsingConfig) -> bool {
    match check_entry(text, config) {
        None => true,
        Some(reason) => {
            tracing::trace!(?reason, text, "rejected candidate entry");
            false
        }
    }
}

fn has_year_in_range(text: &str, config: &ParsingConfig) -> bool {
    // Adjacent years share a separator, so resume right after each captured
    // year rather than after the whole match.
    let mut pos = 0;
    while let Some(caps) = YEAR_TOKEN_RE.captures_at(text, pos) {
        let Some(year) = caps.get(1) else { break };
        let in_range = year
            .as_str()
            .parse::<u32>()
            .is_ok_and(|value| (config.min_year..=config.max_year).contains(&value));
        if in_range {
            return true;
        }
        pos = year.end();
    }
    false
}

/// Drop repeated entries, keeping the first occurrence of each.
///
/// Equality is case-insensitive over whitespace-collapsed text. Applying
/// this twice yields the same sequence as applying it once.
pub fn dedup_entries(entries: Vec<ReferenceEntry>) -> Vec<ReferenceEntry> {
    let mut seen = HashSet::new();
    let before = entries.len();
    let kept: Vec<ReferenceEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.dedup_key()))
        .collect();
    if kept.len() < before {
        tracing::debug!(removed = before - kept.len(), "dropped duplicate entries");
    }
    kept
}
