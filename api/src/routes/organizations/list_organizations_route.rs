use std::sync::Arc;

use axum::{extract::State, response::Response};

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// `GET /organizations`: the routing directory.
pub async fn list_organizations_route(State(state): State<Arc<AppState>>) -> Response {
    ApiResponse::ok(state.service.list_organizations())
}
