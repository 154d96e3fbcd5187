//! Survey Insights binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared config, and the
//! Prometheus exposition endpoint.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use survey_insights::api::{self, AppState};
use survey_insights::config::InsightConfig;
use survey_insights::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("survey_insights=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when variables come from the real
    // environment.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = InsightConfig::from_env();
    tracing::info!(provider = ?config.provider, "insight config loaded");

    let metrics = Metrics::init();
    let app = api::create_router(AppState::new(config)).merge(metrics.router());

    let addr = std::env::var("INSIGHT_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "survey-insights listening");
    axum::serve(listener, app).await?;

    Ok(())
}
