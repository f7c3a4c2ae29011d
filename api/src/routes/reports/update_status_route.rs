use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::HeaderMap,
    response::Response,
};
use report_core::ReportStatus;
use tracing::{info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::{reports::update_status_request::UpdateStatusRequest, request_id},
};

/// `PATCH /reports/{id}/status`: one lifecycle step.
///
/// Updating a duplicate moves its canonical report; the answer names the
/// report that actually changed.
#[instrument(name = "update_status_route", skip_all, fields(request_id = %request_id(&headers), report_id = %id))]
pub async fn update_status_route(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Response> {
    let to: ReportStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::bad_request("status", e))?;

    let change = state.service.update_status(&id, to).await?;

    info!(
        canonical_id = %change.report_id,
        status = %change.status,
        organization = change.organization.as_deref().unwrap_or("-"),
        "update_status_route: done"
    );
    Ok(ApiResponse::ok(change))
}
