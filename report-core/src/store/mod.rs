//! Persistence abstraction for reports.
//!
//! Backends must enforce at most one canonical report (`duplicate_of` unset)
//! per fingerprint: a second canonical insert fails with
//! [`StoreError::FingerprintTaken`]. The dedup engine relies on that as the
//! compare-and-swap backstop behind its in-process lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::StoreError;
use crate::model::{Report, ReportStatus};

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Status mutation applied atomically to one report.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: ReportStatus,
    /// Replaces the organization when `Some`.
    pub organization: Option<String>,
    /// Stamped when `Some`; never cleared.
    pub resolved_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts a new report.
    async fn insert(&self, report: &Report) -> StoreResult<()>;

    /// Canonical report holding `fingerprint`, if any.
    async fn find_by_fingerprint(&self, fingerprint: &str) -> StoreResult<Option<Report>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Report>>;

    /// Applies `update` to report `id` and returns the stored result.
    async fn update_status(&self, id: &str, update: StatusUpdate) -> StoreResult<Report>;

    /// Bumps the duplicate counter of canonical report `id`; returns the new count.
    async fn increment_duplicates(&self, id: &str) -> StoreResult<u32>;

    /// Point-in-time snapshot of every report.
    async fn scan(&self) -> StoreResult<Vec<Report>>;
}
