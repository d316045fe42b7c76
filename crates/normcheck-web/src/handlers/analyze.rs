use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};

use normcheck_core::Norm;
use normcheck_ingest::analyze_file;
use normcheck_reporting::write_text_report;

use crate::error::ApiError;
use crate::models::AnalysisResponse;
use crate::state::AppState;
use crate::upload;

/// `POST /api/analizar/{norma}`
pub async fn analyze_with_norm(
    State(state): State<Arc<AppState>>,
    Path(norma): Path<String>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let norm: Norm = norma.parse().map_err(ApiError::unprocessable)?;
    run_analysis(state, Some(norm), multipart).await
}

/// `POST /api/analizar`: the norm is inferred from the reference list.
pub async fn analyze_detect(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    run_analysis(state, None, multipart).await
}

async fn run_analysis(
    state: Arc<AppState>,
    norm: Option<Norm>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let upload = upload::parse_multipart(multipart).await?;

    // Removed on drop, whichever way this function exits.
    let temp_dir = tempfile::tempdir().map_err(ApiError::processing)?;
    let path = temp_dir.path().join(&upload.filename);
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(ApiError::processing)?;

    let analysis = analyze_file(
        &path,
        norm,
        &state.extractor,
        state.parser.as_ref(),
        &state.analyzer,
        &state.shutdown,
    )
    .await
    .map_err(|e| {
        tracing::warn!(file = %upload.filename, error = %e, "analysis failed");
        ApiError::processing(e)
    })?;
    drop(temp_dir);

    let report_path = write_text_report(
        &analysis.result,
        &analysis.file_name,
        &state.reports_dir,
        chrono::Local::now().naive_local(),
    )
    .map_err(ApiError::processing)?;

    let result = analysis.result;
    tracing::info!(
        file = %analysis.file_name,
        norm = result.norm.as_str(),
        compliant = result.compliant,
        total = result.total_citations,
        valid = result.valid_citations.len(),
        invalid = result.invalid_citations.len(),
        report = %report_path.display(),
        "request analysed"
    );

    Ok(Json(AnalysisResponse {
        result,
        archivo_reporte: report_path.display().to_string(),
    }))
}
