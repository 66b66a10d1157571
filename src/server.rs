//! HTTP API for the research assistant.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/ask` | Run the pipeline for `{ "question": "..." }` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Question cannot be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `pipeline_error` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use research_harness_core::ToolChoice;

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::runtime::build_pipeline;

/// Starts the HTTP server on `[server].bind` and runs until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pipeline = Arc::new(build_pipeline(config).await?);
    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "research server listening");
    serve(listener, pipeline).await
}

/// Serve the API on an already-bound listener.
pub async fn serve(listener: TcpListener, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

/// The API routes with CORS applied.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ask", post(handle_ask))
        .layer(cors)
        .with_state(pipeline)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn pipeline_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "pipeline_error",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ask ============

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub citations: Vec<String>,
    pub tool: Option<ToolChoice>,
    pub timestamp: DateTime<Utc>,
}

/// Returns `400` for a missing, malformed, or blank question and `500` when
/// the run ended with an error set.
async fn handle_ask(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(request) = body.map_err(|e| bad_request(e.body_text()))?;
    let question = request
        .question
        .ok_or_else(|| bad_request("No question provided"))?;
    let question = question.trim();
    if question.is_empty() {
        return Err(bad_request("Question cannot be empty"));
    }

    let state = pipeline.run(question).await;
    if let Some(error) = state.error {
        return Err(pipeline_error(error));
    }

    Ok(Json(AskResponse {
        question: state.question,
        answer: state.answer.unwrap_or_default(),
        citations: state.citations,
        tool: state.tool_choice,
        timestamp: Utc::now(),
    }))
}
