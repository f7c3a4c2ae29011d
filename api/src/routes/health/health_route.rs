use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::health::health_response::HealthResponse,
};

/// `GET /health`: liveness plus LLM provider probes when one is configured.
///
/// Always `200`; a failed probe only degrades `status`.
#[instrument(name = "health_route", skip_all)]
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let llm = match &state.llm {
        Some(profiles) => profiles.health_all().await,
        None => Vec::new(),
    };
    let status = if llm.iter().all(|p| p.ok) { "ok" } else { "degraded" };
    debug!(status, probes = llm.len(), "health_route: done");

    let collaborator = state
        .service
        .classifier()
        .collaborator()
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| "none".into());

    ApiResponse::success(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store: state.store_backend,
        collaborator,
        llm,
    })
    .into_response_with_status(StatusCode::OK)
}
