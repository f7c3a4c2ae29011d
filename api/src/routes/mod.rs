use axum::http::HeaderMap;

pub mod analytics;
pub mod health;
pub mod organizations;
pub mod public_reports;
pub mod reports;

/// `X-Request-Id` of the incoming request, `-` when absent.
pub(crate) fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
}
