use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
};
use tracing::instrument;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
};

/// `GET /reports/{id}/status`: anonymous tracking, `{status, category, urgency}` only.
#[instrument(name = "report_status_route", skip(state))]
pub async fn report_status_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let view = state.service.get_report_status(&id).await?;
    Ok(ApiResponse::ok(view))
}
