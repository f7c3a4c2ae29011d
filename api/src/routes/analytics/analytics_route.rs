use std::sync::Arc;

use axum::{extract::State, response::Response};
use tracing::instrument;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

/// `GET /analytics`: metrics over a point-in-time snapshot of the store.
#[instrument(name = "analytics_route", skip_all)]
pub async fn analytics_route(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    let metrics = state.service.get_analytics().await?;
    Ok(ApiResponse::ok(metrics))
}
