//! In-process store backed by a `RwLock`ed map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ReportStore, StatusUpdate, StoreResult};
use crate::errors::StoreError;
use crate::model::Report;

#[derive(Default)]
struct Tables {
    reports: HashMap<String, Report>,
    /// fingerprint -> canonical report id
    canonical: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert(&self, report: &Report) -> StoreResult<()> {
        let mut t = self.inner.write().await;
        if t.reports.contains_key(&report.id) {
            return Err(StoreError::IdTaken(report.id.clone()));
        }
        if report.is_canonical() {
            if t.canonical.contains_key(&report.fingerprint) {
                return Err(StoreError::FingerprintTaken(report.fingerprint.clone()));
            }
            t.canonical
                .insert(report.fingerprint.clone(), report.id.clone());
        }
        t.reports.insert(report.id.clone(), report.clone());
        Ok(())
    }

    async fn find_by_fingerprint(&self, fingerprint: &str) -> StoreResult<Option<Report>> {
        let t = self.inner.read().await;
        Ok(t.canonical
            .get(fingerprint)
            .and_then(|id| t.reports.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Report>> {
        Ok(self.inner.read().await.reports.get(id).cloned())
    }

    async fn update_status(&self, id: &str, update: StatusUpdate) -> StoreResult<Report> {
        let mut t = self.inner.write().await;
        let report = t
            .reports
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;
        report.status = update.status;
        if let Some(org) = update.organization {
            report.organization = Some(org);
        }
        if report.resolved_at.is_none() {
            report.resolved_at = update.resolved_at;
        }
        Ok(report.clone())
    }

    async fn increment_duplicates(&self, id: &str) -> StoreResult<u32> {
        let mut t = self.inner.write().await;
        let report = t
            .reports
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;
        report.duplicate_count += 1;
        Ok(report.duplicate_count)
    }

    async fn scan(&self) -> StoreResult<Vec<Report>> {
        Ok(self.inner.read().await.reports.values().cloned().collect())
    }
}
