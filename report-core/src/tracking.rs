//! Anonymous tracking and the public transparency listing.
//!
//! Everything leaving this module is redacted again on the way out, even
//! though stored text is already redacted at intake.

use tracing::debug;

use crate::errors::{ReportError, ReportResult};
use crate::model::{PublicReport, Report, ReportStatus, TrackingView};
use crate::redact::redact;
use crate::store::ReportStore;

/// Fixed page size of the public listing.
pub const PUBLIC_PAGE_SIZE: usize = 25;

/// Filter for [`list_public`].
#[derive(Debug, Clone, Default)]
pub struct PublicQuery {
    /// `in-progress` or `resolved`; `None` means both.
    pub status: Option<ReportStatus>,
    /// Case-insensitive match over redacted title and description.
    pub search: Option<String>,
    pub offset: usize,
}

/// Loads the canonical report that owns the status of `id`.
async fn load_canonical(store: &dyn ReportStore, id: &str) -> ReportResult<Report> {
    let report = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ReportError::NotFound(id.to_string()))?;
    match &report.duplicate_of {
        None => Ok(report),
        Some(cid) => store
            .find_by_id(cid)
            .await?
            .ok_or_else(|| ReportError::NotFound(cid.clone())),
    }
}

/// Status lookup by identifier; never exposes text or submitter data.
///
/// Every field comes from the canonical report, so all members of a
/// duplicate cluster track identically.
pub async fn track(store: &dyn ReportStore, id: &str) -> ReportResult<TrackingView> {
    let canonical = load_canonical(store, id).await?;
    Ok(TrackingView {
        status: canonical.status,
        category: canonical.category,
        urgency: canonical.urgency,
    })
}

/// Redacted, newest-first page of publicly visible canonical reports.
pub async fn list_public(store: &dyn ReportStore, query: &PublicQuery) -> ReportResult<Vec<PublicReport>> {
    if let Some(status) = query.status {
        if !status.is_public() {
            return Err(ReportError::Validation(format!(
                "status filter must be in-progress or resolved, got {status}"
            )));
        }
    }
    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut visible: Vec<PublicReport> = store
        .scan()
        .await?
        .into_iter()
        .filter(|r| r.is_canonical() && r.status.is_public())
        .filter(|r| query.status.is_none_or(|s| s == r.status))
        .map(to_public)
        .filter(|p| match &needle {
            Some(n) => {
                p.title.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
            }
            None => true,
        })
        .collect();

    visible.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then_with(|| a.id.cmp(&b.id)));
    let total = visible.len();
    let page: Vec<PublicReport> = visible
        .into_iter()
        .skip(query.offset)
        .take(PUBLIC_PAGE_SIZE)
        .collect();
    debug!(total, returned = page.len(), offset = query.offset, "public listing");
    Ok(page)
}

fn to_public(r: Report) -> PublicReport {
    PublicReport {
        title: redact(&r.title),
        description: redact(&r.description),
        locations: r.entities.locations.iter().map(|l| redact(l)).collect(),
        id: r.id,
        category: r.category,
        urgency: r.urgency,
        status: r.status,
        organization: r.organization,
        submitted_at: r.submitted_at,
        resolved_at: r.resolved_at,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::redact::contains_sensitive;
    use crate::store::MemoryStore;
    use crate::test_support::report;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let base = Utc::now() - Duration::days(40);
        for i in 0..30 {
            let mut r = report(&format!("r{i:02}"), &format!("fp{i}"));
            r.submitted_at = base + Duration::days(i);
            r.status = match i % 3 {
                0 => ReportStatus::Resolved,
                1 => ReportStatus::InProgress,
                _ => ReportStatus::Routed,
            };
            store.insert(&r).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            track(&store, "missing").await,
            Err(ReportError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicates_track_like_their_canonical() {
        let store = MemoryStore::new();
        let mut a = report("a", "fp");
        a.status = ReportStatus::InProgress;
        store.insert(&a).await.unwrap();
        let mut b = report("b", "fp");
        b.duplicate_of = Some("a".into());
        b.status = ReportStatus::Submitted;
        b.category = "safety".into();
        b.urgency = crate::model::Urgency::Low;
        store.insert(&b).await.unwrap();

        let view = track(&store, "b").await.unwrap();
        assert_eq!(view, track(&store, "a").await.unwrap());
        assert_eq!(view.status, ReportStatus::InProgress);
        assert_eq!(view.category, a.category);
        assert_eq!(view.urgency, a.urgency);
    }

    #[tokio::test]
    async fn listing_is_capped_sorted_and_public_only() {
        let store = seeded().await;
        let page = list_public(&store, &PublicQuery::default()).await.unwrap();
        assert_eq!(page.len(), 20);
        assert!(page.iter().all(|p| p.status.is_public()));
        assert!(page.windows(2).all(|w| w[0].submitted_at >= w[1].submitted_at));

        let resolved = list_public(
            &store,
            &PublicQuery {
                status: Some(ReportStatus::Resolved),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(resolved.len(), 10);
    }

    #[tokio::test]
    async fn page_size_and_offset() {
        let store = MemoryStore::new();
        for i in 0..30 {
            let mut r = report(&format!("r{i:02}"), &format!("fp{i}"));
            r.status = ReportStatus::Resolved;
            store.insert(&r).await.unwrap();
        }
        let first = list_public(&store, &PublicQuery::default()).await.unwrap();
        assert_eq!(first.len(), PUBLIC_PAGE_SIZE);
        let rest = list_public(
            &store,
            &PublicQuery {
                offset: PUBLIC_PAGE_SIZE,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rest.len(), 5);
    }

    #[tokio::test]
    async fn non_public_status_filter_is_rejected() {
        let store = MemoryStore::new();
        let err = list_public(
            &store,
            &PublicQuery {
                status: Some(ReportStatus::Routed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[tokio::test]
    async fn listing_redacts_again_and_searches() {
        let store = MemoryStore::new();
        let mut leaky = report("a", "fp1");
        leaky.title = "Broken pipe, mail jane@example.org".into();
        leaky.status = ReportStatus::Resolved;
        store.insert(&leaky).await.unwrap();
        let mut other = report("b", "fp2");
        other.title = "Fallen tree".into();
        other.status = ReportStatus::InProgress;
        store.insert(&other).await.unwrap();

        let all = list_public(&store, &PublicQuery::default()).await.unwrap();
        assert!(all.iter().all(|p| !contains_sensitive(&p.title)));

        let hits = list_public(
            &store,
            &PublicQuery {
                search: Some("  PIPE ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Broken pipe, mail [EMAIL REDACTED]");
    }
}
