//! Fingerprint deduplication.
//!
//! `find_or_create` runs inside a critical section keyed by fingerprint, so
//! two submissions with the same content inside this process serialize. The
//! store's unique canonical-fingerprint constraint covers writers in other
//! processes: losing that race turns the insert into a duplicate attach.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{ReportResult, StoreError};
use crate::fingerprint::short;
use crate::locks::KeyedLocks;
use crate::model::Report;
use crate::store::ReportStore;

/// Where a candidate ended up.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Canonical report of the cluster, with its updated duplicate count.
    pub canonical: Report,
    /// The row written for this submission.
    pub stored: Report,
    pub is_duplicate: bool,
}

#[derive(Clone)]
pub struct DedupEngine {
    store: Arc<dyn ReportStore>,
    locks: KeyedLocks,
}

impl DedupEngine {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Stores `candidate` as canonical, or as a duplicate of the existing
    /// canonical report with the same fingerprint.
    pub async fn find_or_create(&self, candidate: Report) -> ReportResult<Placement> {
        let fp = candidate.fingerprint.clone();
        let _guard = self.locks.lock(&fp).await;

        if let Some(canonical) = self.store.find_by_fingerprint(&fp).await? {
            return self.attach(canonical, candidate).await;
        }

        match self.store.insert(&candidate).await {
            Ok(()) => {
                info!(report_id = %candidate.id, fingerprint = short(&fp), "canonical report created");
                Ok(Placement {
                    canonical: candidate.clone(),
                    stored: candidate,
                    is_duplicate: false,
                })
            }
            Err(StoreError::FingerprintTaken(_)) => {
                warn!(fingerprint = short(&fp), "lost canonical insert race; attaching as duplicate");
                let canonical = self
                    .store
                    .find_by_fingerprint(&fp)
                    .await?
                    .ok_or_else(|| StoreError::FingerprintTaken(fp.clone()))?;
                self.attach(canonical, candidate).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn attach(&self, mut canonical: Report, mut candidate: Report) -> ReportResult<Placement> {
        candidate.duplicate_of = Some(canonical.id.clone());
        candidate.status = canonical.status;
        candidate.organization = canonical.organization.clone();
        candidate.resolved_at = canonical.resolved_at;

        self.store.insert(&candidate).await?;
        canonical.duplicate_count = self.store.increment_duplicates(&canonical.id).await?;

        debug!(
            report_id = %candidate.id,
            canonical_id = %canonical.id,
            duplicates = canonical.duplicate_count,
            "duplicate recorded"
        );
        Ok(Placement {
            canonical,
            stored: candidate,
            is_duplicate: true,
        })
    }
}
