use serde::Serialize;

use normcheck_core::NormResult;

#[derive(Serialize)]
pub struct Banner {
    pub mensaje: &'static str,
}

/// The evaluated result plus the path of the text report written for it.
#[derive(Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub result: NormResult,
    pub archivo_reporte: String,
}
