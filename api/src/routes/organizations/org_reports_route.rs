use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use tracing::{debug, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::organizations::org_reports_query::OrgReportsQuery,
};

/// `GET /organizations/{name}/reports`: newest canonical reports routed to `name`.
#[instrument(name = "org_reports_route", skip(state, query), fields(limit = ?query.limit))]
pub async fn org_reports_route(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<OrgReportsQuery>,
) -> AppResult<Response> {
    let reports = state.service.get_org_reports(&name, query.limit).await?;
    debug!(count = reports.len(), "org_reports_route: done");
    Ok(ApiResponse::ok(reports))
}
