use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Response};
use tracing::{info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::analytics::insights_request::InsightsRequest,
};

/// `POST /analytics/insights`: narrative over the given or current metrics.
///
/// Collaborator failures come back as text in `insights`, never as an error.
#[instrument(name = "insights_route", skip_all)]
pub async fn insights_route(State(state): State<Arc<AppState>>, body: Bytes) -> AppResult<Response> {
    let req = InsightsRequest::from_body(&body)?;
    let supplied = req.metrics.is_some();

    let insights = state.service.generate_ai_insights(req.metrics).await;

    info!(supplied, chars = insights.insights.len(), "insights_route: done");
    Ok(ApiResponse::ok(insights))
}
