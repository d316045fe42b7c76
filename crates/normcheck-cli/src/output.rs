use std::io::Write;
use std::path::Path;

use normcheck_core::{CitationVerdict, Confidence, StyleClassification};
use normcheck_ingest::Analysis;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn rule(w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", "=".repeat(50))
}

/// Print the console summary of one analysed document.
pub fn print_analysis(
    w: &mut dyn Write,
    analysis: &Analysis,
    report_path: Option<&Path>,
    color: ColorMode,
) -> std::io::Result<()> {
    let result = &analysis.result;

    rule(w)?;
    writeln!(w, "ANÁLISIS DE DOCUMENTO: {}", analysis.file_name)?;
    writeln!(w, "NORMA: {}", result.norm.label())?;
    match (result.compliant, color.enabled()) {
        (true, true) => writeln!(w, "CUMPLE: {}", "SÍ".green().bold())?,
        (false, true) => writeln!(w, "CUMPLE: {}", "NO".red().bold())?,
        (true, false) => writeln!(w, "CUMPLE: SÍ")?,
        (false, false) => writeln!(w, "CUMPLE: NO")?,
    }
    writeln!(w, "DETALLES: {}", result.summary)?;
    writeln!(w, "TOTAL CITAS: {}", result.total_citations)?;
    writeln!(w, "  - Válidas: {}", result.valid_citations.len())?;
    writeln!(w, "  - Inválidas: {}", result.invalid_citations.len())?;

    if !result.errors.is_empty() {
        writeln!(w, "ERRORES ENCONTRADOS:")?;
        for error in &result.errors {
            if color.enabled() {
                writeln!(w, "  - {}", error.yellow())?;
            } else {
                writeln!(w, "  - {}", error)?;
            }
        }
    }

    for cita in &result.invalid_citations {
        let reason = cita.reason.as_deref().unwrap_or("");
        if color.enabled() {
            writeln!(w, "  {} {}", "✗".red(), cita.text)?;
            writeln!(w, "    {}", reason.dimmed())?;
        } else {
            writeln!(w, "  ✗ {}", cita.text)?;
            writeln!(w, "    {}", reason)?;
        }
    }

    if let Some(path) = report_path {
        writeln!(w, "REPORTE GENERADO: {}", path.display())?;
    }
    rule(w)?;
    Ok(())
}

/// Print a style classification and its per-style tally.
pub fn print_classification(
    w: &mut dyn Write,
    file_name: &str,
    entries: usize,
    classification: &StyleClassification,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "{}: {} referencias extraídas", file_name, entries)?;

    let style = classification.style.as_str();
    let confidence = classification.confidence.label();
    if color.enabled() {
        let confidence = match classification.confidence {
            Confidence::High => confidence.green().to_string(),
            Confidence::Medium => confidence.yellow().to_string(),
            Confidence::Low | Confidence::None => confidence.red().to_string(),
        };
        writeln!(w, "Estilo: {} (confianza {})", style.bold(), confidence)?;
    } else {
        writeln!(w, "Estilo: {} (confianza {})", style, confidence)?;
    }
    writeln!(w, "{}", classification.details())?;

    for (style, count) in &classification.evidence_counts {
        writeln!(w, "  {:<10} {}", style.as_str(), count)?;
    }
    Ok(())
}

/// Print a single grammar verdict.
pub fn print_verdict(
    w: &mut dyn Write,
    verdict: &CitationVerdict,
    color: ColorMode,
) -> std::io::Result<()> {
    match (&verdict.reason, color.enabled()) {
        (None, true) => writeln!(w, "{} {}", "✓ VÁLIDA".green(), verdict.text),
        (None, false) => writeln!(w, "✓ VÁLIDA {}", verdict.text),
        (Some(reason), true) => {
            writeln!(w, "{} {}", "✗ INVÁLIDA".red(), verdict.text)?;
            writeln!(w, "  Razón: {}", reason)
        }
        (Some(reason), false) => {
            writeln!(w, "✗ INVÁLIDA {}", verdict.text)?;
            writeln!(w, "  Razón: {}", reason)
        }
    }
}
