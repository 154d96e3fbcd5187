// src/api.rs
//! HTTP surface over the insight façades. Owns no aggregation logic:
//! handlers construct an insight from the shared config, await it, and
//! serialize the report.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;

use crate::aggregate::mention::{EntityReport, PhraseReport};
use crate::aggregate::sentiment::SentimentReport;
use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::insight::{EntityInsight, KeyPhraseInsight, SentimentInsight};
use crate::types::{Entry, ExtractOptions};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<InsightConfig>,
}

impl AppState {
    pub fn new(config: InsightConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/insights/sentiment", post(sentiment))
        .route("/insights/phrases", post(phrases))
        .route("/insights/entities", post(entities))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct SentimentReq {
    entries: Vec<Entry>,
    #[serde(default)]
    question: Option<String>,
}

#[derive(serde::Deserialize)]
struct ExtractReq {
    entries: Vec<Entry>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: ExtractOptions,
}

async fn sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentReq>,
) -> Result<Json<SentimentReport>, ApiError> {
    counter!("insight_requests_total", "endpoint" => "sentiment").increment(1);
    let insight = SentimentInsight::new(&state.config)?;
    let report = insight.analyze(&body.entries, body.question.as_deref()).await?;
    Ok(Json(report))
}

async fn phrases(
    State(state): State<AppState>,
    Json(body): Json<ExtractReq>,
) -> Result<Json<PhraseReport>, ApiError> {
    counter!("insight_requests_total", "endpoint" => "phrases").increment(1);
    let insight = KeyPhraseInsight::new(&state.config)?;
    let report = insight
        .extract_with_options(&body.entries, body.question.as_deref(), &body.options)
        .await?;
    Ok(Json(report))
}

async fn entities(
    State(state): State<AppState>,
    Json(body): Json<ExtractReq>,
) -> Result<Json<EntityReport>, ApiError> {
    counter!("insight_requests_total", "endpoint" => "entities").increment(1);
    let insight = EntityInsight::new(&state.config)?;
    let report = insight
        .extract_with_options(&body.entries, body.question.as_deref(), &body.options)
        .await?;
    Ok(Json(report))
}

/// Maps the library error taxonomy onto HTTP statuses: caller mistakes are
/// 4xx, upstream provider trouble is 502.
struct ApiError(InsightError);

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InsightError::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            InsightError::Unsupported { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            InsightError::MissingApiKey(_) => StatusCode::INTERNAL_SERVER_ERROR,
            InsightError::Transport(_)
            | InsightError::Payload(_)
            | InsightError::Exhausted { .. } => StatusCode::BAD_GATEWAY,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
