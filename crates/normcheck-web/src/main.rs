use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use normcheck_core::config_file;
use normcheck_grobid::GrobidClient;
use normcheck_ingest::TextExtractor;
use normcheck_parsing::{NormAnalyzer, ParsingConfigBuilder};

mod error;
mod handlers;
mod models;
mod settings;
mod state;
mod upload;

use settings::ServerSettings;
use state::AppState;

fn app(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/api/analizar", post(handlers::analyze::analyze_detect))
        .route(
            "/api/analizar/{norma}",
            post(handlers::analyze::analyze_with_norm),
        )
        .layer(axum::extract::DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = config_file::load_config();
    let settings = ServerSettings::resolve(&file_config, |key| std::env::var(key).ok());

    let mut builder = ParsingConfigBuilder::new();
    if let Some(overrides) = &file_config.parsing {
        builder = builder.apply_overrides(overrides);
    }
    let analyzer = NormAnalyzer::with_config(
        builder.build().context("invalid [parsing] configuration")?,
    );

    tokio::fs::create_dir_all(&settings.reports_dir)
        .await
        .with_context(|| format!("cannot create {}", settings.reports_dir.display()))?;

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState {
        extractor: TextExtractor::new(),
        parser: Arc::new(
            GrobidClient::new(settings.grobid_url.clone()).with_timeout(settings.grobid_timeout),
        ),
        analyzer,
        reports_dir: settings.reports_dir.clone(),
        shutdown: shutdown.clone(),
    });

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .with_context(|| format!("cannot bind {}", settings.bind_addr()))?;
    tracing::info!(
        grobid = %settings.grobid_url,
        reports = %settings.reports_dir.display(),
        "listening on http://{}",
        settings.bind_addr()
    );

    axum::serve(listener, app(state, settings.max_upload_bytes))
        .with_graceful_shutdown(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
            }
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
