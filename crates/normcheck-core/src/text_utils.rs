//! Cleanup applied to raw text coming out of extraction backends.

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Normalise extracted text: ligatures expanded, non-breaking spaces turned
/// into plain spaces, soft hyphens and BOMs dropped, CRLF folded to LF.
pub fn normalize_extracted(text: &str) -> String {
    expand_ligatures(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(['\u{00A0}', '\u{2007}', '\u{202F}'], " ")
        .replace(['\u{00AD}', '\u{FEFF}'], "")
}
