use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::{request_id, reports::submit_report_request::SubmitReportRequest},
};

/// `POST /reports`: intake of one citizen report.
///
/// Answers `201` with `{report_id, status, category, analysis_result, duplicate_of}`;
/// a duplicate submission is a success too and carries `duplicate_of`.
#[instrument(name = "submit_report_route", skip_all, fields(request_id = %request_id(&headers)))]
pub async fn submit_report_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SubmitReportRequest>,
) -> AppResult<Response> {
    debug!(
        has_image = body.image.is_some(),
        anonymous = body.name.is_none() && body.email.is_none(),
        "submit_report_route: start"
    );

    let outcome = state.service.submit_report(body.into()).await?;

    info!(
        report_id = %outcome.report_id,
        status = %outcome.status,
        duplicate = outcome.duplicate_of.is_some(),
        "submit_report_route: accepted"
    );
    Ok(ApiResponse::success(outcome).into_response_with_status(StatusCode::CREATED))
}
