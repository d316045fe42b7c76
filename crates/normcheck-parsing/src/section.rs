use crate::config::ParsingConfig;

/// Byte offsets bounding the bibliography inside the document text.
///
/// `start` is the first byte after the heading token; `end` is the start of
/// the trailing section (annex, signature, author block) or the end of the
/// document. Always `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub start: usize,
    pub end: usize,
}

impl SectionSpan {
    /// The section text within `text`, which must be the document the span
    /// was located in.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Locate the bibliography section with the default vocabulary and return
/// its text.
pub fn find_references_section(text: &str) -> Option<&str> {
    locate_section(text, &ParsingConfig::default()).map(|span| span.slice(text))
}

/// Find the bibliography span in `text`.
///
/// The first heading token anywhere in the text opens the section. The first
/// trailing-section marker at the start of a later line closes it; without
/// one the section runs to the end of the document. `None` means no
/// bibliography was detected, which callers treat as "no references" rather
/// than as an error.
pub fn locate_section(text: &str, config: &ParsingConfig) -> Option<SectionSpan> {
    let heading = config.heading_re.find(text)?;
    let start = heading.end();

    // find_at keeps the `^` anchor honest: it only matches after a newline,
    // never at `start` itself.
    let end = config
        .trailing_re
        .find_at(text, start)
        .map(|m| m.start())
        .unwrap_or(text.len());

    let span = SectionSpan { start, end };
    if span.is_empty() {
        tracing::debug!(heading = heading.as_str(), "bibliography heading has no body");
        return None;
    }
    tracing::debug!(
        heading = heading.as_str(),
        start,
        end,
        "located bibliography section"
    );
    Some(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;

    #[test]
    fn test_no_heading_returns_none() {
        let text = "Introducción\n\nTexto sin lista de obras citadas.\n";
        assert!(find_references_section(text).is_none());
    }

    #[test]
    fn test_heading_word_inside_prose_counts() {
        let text = "Como indica la bibliografía consultada, el tema es amplio.\n";
        assert!(find_references_section(text).is_some());
    }

    #[test]
    fn test_start_is_after_heading() {
        let text = "Cuerpo.\nREFERENCIAS\nGarcía, J. (2020). Título. Editorial.\n";
        let config = ParsingConfig::default();
        let span = locate_section(text, &config).unwrap();
        assert_eq!(&text[..span.start], "Cuerpo.\nREFERENCIAS");
        assert_eq!(span.end, text.len());
        assert!(span.slice(text).contains("García, J. (2020)"));
    }

    #[test]
    fn test_heading_is_case_insensitive_with_accents() {
        for heading in ["Bibliografía", "BIBLIOGRAFÍA", "bibliografia", "References"] {
            let text = format!("Body.\n{}\nSmith, J. (2020). Title.\n", heading);
            assert!(
                find_references_section(&text).is_some(),
                "heading {heading} not found"
            );
        }
    }

    #[test]
    fn test_first_heading_wins() {
        let text = "Índice\nReferencias ..... 40\nCapítulo 1\nReferencias\nRef A (2020).\n";
        let span = locate_section(text, &ParsingConfig::default()).unwrap();
        assert!(span.slice(text).starts_with(" ..... 40"));
    }

    #[test]
    fn test_trailing_marker_ends_section() {
        let text = "Body.\n\nReferencias\n\nGarcía, J. (2020). Uno.\n\nANEXO A\n\nEncuesta aplicada.";
        let section = find_references_section(text).unwrap();
        assert!(section.contains("García"));
        assert!(!section.contains("Encuesta"));
        assert!(!section.contains("ANEXO"));
    }

    #[test]
    fn test_trailing_marker_must_start_line() {
        let text = "Referencias\nPérez, A. (2019). Ver el anexo técnico. Revista.\nFIRMA del tutor";
        let section = find_references_section(text).unwrap();
        assert!(section.contains("Ver el anexo técnico"));
        assert!(!section.contains("FIRMA"));
    }

    #[test]
    fn test_author_block_marker() {
        let text = "References\nSmith, J. (2020). Title.\nAUTOR(ES): Ana Ruiz\n";
        let section = find_references_section(text).unwrap();
        assert!(!section.contains("Ana Ruiz"));
    }

    #[test]
    fn test_heading_at_end_of_text_is_none() {
        assert!(find_references_section("Body text.\nREFERENCES").is_none());
    }

    #[test]
    fn test_custom_heading_token() {
        let config = ParsingConfigBuilder::new()
            .add_heading_token("LITERATURA CITADA".to_string())
            .build()
            .unwrap();
        let text = "Cuerpo.\nLiteratura citada\nRuiz, P. (2018). Obra.\n";
        let span = locate_section(text, &config).unwrap();
        assert!(span.slice(text).contains("Ruiz"));
    }

    #[test]
    fn test_custom_trailing_marker() {
        let config = ParsingConfigBuilder::new()
            .add_trailing_marker("GLOSARIO".to_string())
            .build()
            .unwrap();
        let text = "Referencias\nRuiz, P. (2018). Obra.\nGlosario\nTérmino: definición.";
        let span = locate_section(text, &config).unwrap();
        assert!(!span.slice(text).contains("Término"));
    }
}
