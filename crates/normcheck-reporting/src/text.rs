//! Plain-text analysis report.
//!
//! Layout, top to bottom: banner, file/date/norm/verdict header, RESUMEN,
//! numbered ERRORES ENCONTRADOS (only when present), ANÁLISIS DE CITAS with
//! the three counts, the numbered valid and invalid lists, footer.

use chrono::NaiveDateTime;

use normcheck_core::{CitationVerdict, NormResult};

use crate::ReportError;

const WIDTH: usize = 70;

const TOTAL_LABEL: &str = "Total de citas encontradas:";
const VALID_LABEL: &str = "Citas válidas:";
const INVALID_LABEL: &str = "Citas inválidas:";

fn rule(out: &mut String, c: char) {
    out.extend(std::iter::repeat_n(c, WIDTH));
    out.push('\n');
}

fn verdict_label(compliant: bool) -> &'static str {
    if compliant { "✓ CUMPLE" } else { "✗ NO CUMPLE" }
}

fn write_citation_list(out: &mut String, title: &str, citations: &[CitationVerdict]) {
    if citations.is_empty() {
        return;
    }
    out.push_str(title);
    out.push('\n');
    rule(out, '-');
    for (i, cita) in citations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, cita.text));
        if let Some(reason) = &cita.reason {
            out.push_str(&format!("   Razón: {}\n", reason));
        }
    }
    out.push('\n');
}

/// Render `result` as the plain-text report for `file_name`.
pub fn render_text_report(
    result: &NormResult,
    file_name: &str,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    rule(&mut out, '=');
    out.push_str("REPORTE DE ANÁLISIS DE NORMAS ACADÉMICAS\n");
    rule(&mut out, '=');
    out.push('\n');

    out.push_str(&format!("Archivo analizado: {}\n", file_name));
    out.push_str(&format!(
        "Fecha: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("Norma evaluada: {}\n", result.norm.label()));
    out.push_str(&format!("Resultado: {}\n", verdict_label(result.compliant)));
    out.push('\n');
    rule(&mut out, '-');
    out.push('\n');

    out.push_str("RESUMEN:\n");
    out.push_str(&format!("{}\n\n", result.summary));

    if !result.errors.is_empty() {
        out.push_str("ERRORES ENCONTRADOS:\n");
        for (i, error) in result.errors.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        out.push('\n');
    }

    rule(&mut out, '-');
    out.push_str("ANÁLISIS DE CITAS\n");
    rule(&mut out, '-');
    out.push('\n');

    out.push_str(&format!("{} {}\n", TOTAL_LABEL, result.total_citations));
    out.push_str(&format!("{} {}\n", VALID_LABEL, result.valid_citations.len()));
    out.push_str(&format!(
        "{} {}\n\n",
        INVALID_LABEL,
        result.invalid_citations.len()
    ));

    write_citation_list(&mut out, "CITAS VÁLIDAS:", &result.valid_citations);
    write_citation_list(&mut out, "CITAS INVÁLIDAS:", &result.invalid_citations);

    rule(&mut out, '=');
    out.push_str("FIN DEL REPORTE\n");
    rule(&mut out, '=');
    out
}

/// The three counts printed under ANÁLISIS DE CITAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportCounts {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

fn count_after(report: &str, label: &str) -> Result<usize, ReportError> {
    let line = report
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .ok_or_else(|| ReportError::Malformed(format!("missing '{}'", label)))?;
    line.trim()
        .parse()
        .map_err(|_| ReportError::Malformed(format!("'{}' is not a count: {}", label, line.trim())))
}

/// Read the citation counts back out of a rendered report.
pub fn parse_report_counts(report: &str) -> Result<ReportCounts, ReportError> {
    Ok(ReportCounts {
        total: count_after(report, TOTAL_LABEL)?,
        valid: count_after(report, VALID_LABEL)?,
        invalid: count_after(report, INVALID_LABEL)?,
    })
}
