use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use report_core::{DirectoryError, ReportError, StoreError};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::{
    app_state::ConfigError,
    http::response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / domain ---
    /// Request could not be read; `field` names the offending input.
    #[error("{message}")]
    BadRequest { field: &'static str, message: String },

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl AppError {
    pub fn bad_request(field: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            field,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Report(e) => match e {
                ReportError::Validation(_) | ReportError::NoRoute(_) => StatusCode::BAD_REQUEST,
                ReportError::InvalidTransition { .. } => StatusCode::CONFLICT,
                ReportError::NotFound(_) | ReportError::UnknownOrganization(_) => StatusCode::NOT_FOUND,
                ReportError::Upstream(_) => StatusCode::BAD_GATEWAY,
                ReportError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            AppError::Config(_)
            | AppError::Llm(_)
            | AppError::Directory(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest { .. } => "ValidationError",
            AppError::Report(e) => e.kind(),
            AppError::Config(_) | AppError::Llm(_) | AppError::Directory(_) => "ConfigError",
            AppError::Bind(_) | AppError::Server(_) => "ServerError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "request failed");
        } else {
            warn!(kind = self.kind(), error = %self, "request rejected");
        }

        let details = match &self {
            AppError::BadRequest { field, .. } => vec![ApiErrorDetail {
                path: Some((*field).to_string()),
                hint: None,
            }],
            AppError::Report(ReportError::InvalidTransition { from, .. }) => vec![ApiErrorDetail {
                path: Some("status".into()),
                hint: Some(format!(
                    "allowed next statuses: {}",
                    report_core::lifecycle::next_statuses(*from)
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            }],
            _ => Vec::new(),
        };

        ApiResponse::<()>::error(self.kind(), self.to_string(), details)
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Report(ReportError::Store(err))
    }
}

#[cfg(test)]
mod tests {
    use report_core::{AiError, ReportStatus};

    use super::*;

    #[test]
    fn domain_errors_map_to_stable_statuses() {
        let cases = [
            (
                AppError::from(ReportError::Validation("title is required".into())),
                StatusCode::BAD_REQUEST,
                "ValidationError",
            ),
            (
                AppError::from(ReportError::InvalidTransition {
                    from: ReportStatus::Submitted,
                    to: ReportStatus::Resolved,
                }),
                StatusCode::CONFLICT,
                "InvalidTransition",
            ),
            (
                AppError::from(ReportError::NotFound("r-1".into())),
                StatusCode::NOT_FOUND,
                "NotFound",
            ),
            (
                AppError::from(ReportError::Upstream(AiError::NotConfigured)),
                StatusCode::BAD_GATEWAY,
                "UpstreamUnavailable",
            ),
            (
                AppError::from(StoreError::Missing("r-2".into())),
                StatusCode::SERVICE_UNAVAILABLE,
                "StoreError",
            ),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.kind(), kind);
        }
    }
}
