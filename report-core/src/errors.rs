//! Crate-wide error hierarchy for report-core.
//!
//! - Single root [`ReportError`] returned by every public operation.
//! - [`ReportError::kind`] gives the stable, machine-readable kind that the
//!   HTTP layer puts into error envelopes.
//! - Store and AI collaborator failures keep their own enums so callers can
//!   tell a retryable persistence failure from an upstream outage.

use std::time::Duration;

use thiserror::Error;

use crate::model::ReportStatus;

/// Convenient alias for crate-wide results.
pub type ReportResult<T> = Result<T, ReportError>;

/// Root error type for the report-core crate.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Request rejected before anything was persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Status change not present in the lifecycle table.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: ReportStatus, to: ReportStatus },

    /// Unknown report id.
    #[error("report not found: {0}")]
    NotFound(String),

    /// Organization name not present in the directory.
    #[error("organization not found: {0}")]
    UnknownOrganization(String),

    /// No organization in the directory accepts this report.
    #[error("no organization accepts category `{0}`")]
    NoRoute(String),

    /// AI collaborator (classifier or summarizer) failed or timed out.
    #[error(transparent)]
    Upstream(#[from] AiError),

    /// Persistence failure; retryable at the caller.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReportError {
    /// Stable error kind exposed to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) | ReportError::NoRoute(_) => "ValidationError",
            ReportError::InvalidTransition { .. } => "InvalidTransition",
            ReportError::NotFound(_) | ReportError::UnknownOrganization(_) => "NotFound",
            ReportError::Upstream(_) => "UpstreamUnavailable",
            ReportError::Store(_) => "StoreError",
        }
    }
}

/// Failures raised by a [`crate::store::ReportStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A canonical report with this fingerprint already exists.
    #[error("canonical report already exists for fingerprint {0}")]
    FingerprintTaken(String),

    /// A report with this id already exists.
    #[error("report id already exists: {0}")]
    IdTaken(String),

    /// Update targeted a row that does not exist.
    #[error("report missing in store: {0}")]
    Missing(String),

    /// Stored row could not be decoded into a report.
    #[error("corrupt row for report {id}: {reason}")]
    Corrupt { id: String, reason: String },

    /// Underlying database error.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures loading the organization directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("cannot read organization directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid organization directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fallback organization `{0}` is not in the directory")]
    UnknownFallback(String),

    #[error("organization directory is empty")]
    Empty,
}

/// Failures delivering a routing notification. Never fail the transition.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The webhook URL is not http(s).
    #[error("invalid notification endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("notification endpoint returned {status}: {snippet}")]
    Rejected { status: u16, snippet: String },
}

/// Failures of the external AI collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    /// The call exceeded its time bound.
    #[error("AI collaborator timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator could not be reached or returned an error status.
    #[error("AI collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered with something we could not use.
    #[error("AI collaborator returned a malformed response: {0}")]
    Malformed(String),

    /// No collaborator is configured.
    #[error("no AI collaborator configured")]
    NotConfigured,
}
