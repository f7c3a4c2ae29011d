use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Response,
};
use report_core::{PUBLIC_PAGE_SIZE, PublicQuery};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::public_reports::{
        public_reports_query::PublicReportsQuery, public_reports_response::PublicReportsResponse,
    },
};

/// `GET /public/reports`: redacted in-progress and resolved reports, newest first.
#[instrument(name = "public_reports_route", skip_all)]
pub async fn public_reports_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PublicReportsQuery>,
) -> AppResult<Response> {
    let query = PublicQuery::try_from(query)?;
    let reports = state.service.get_public_reports(&query).await?;

    let next_offset = (reports.len() == PUBLIC_PAGE_SIZE).then_some(query.offset + reports.len());
    debug!(
        count = reports.len(),
        offset = query.offset,
        status = ?query.status,
        "public_reports_route: page ready"
    );

    let body = PublicReportsResponse {
        reports,
        offset: query.offset,
        page_size: PUBLIC_PAGE_SIZE,
        next_offset,
    };
    Ok(ApiResponse::ok(body))
}
