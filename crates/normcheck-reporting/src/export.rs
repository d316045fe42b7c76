use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use normcheck_core::NormResult;

use crate::ReportError;
use crate::text::render_text_report;

/// `reporte_<file>_<YYYYmmdd_HHMMSS>.txt`, with path separators in the
/// uploaded name replaced so the report stays inside its directory.
pub fn report_file_name(file_name: &str, now: NaiveDateTime) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("reporte_{}_{}.txt", safe, now.format("%Y%m%d_%H%M%S"))
}

/// Render the text report and write it into `dir`, creating the directory
/// if needed. Returns the path of the written file.
pub fn write_text_report(
    result: &NormResult,
    file_name: &str,
    dir: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(file_name, now));

    let content = render_text_report(result, file_name, now);
    let mut file = std::fs::File::create(&path)?;
    file.write_all(content.as_bytes())?;

    tracing::debug!(path = %path.display(), "report written");
    Ok(path)
}

/// Serialize a result with its wire field names (`norma`, `cumple`, ...).
pub fn export_json(result: &NormResult) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(result)?)
}
