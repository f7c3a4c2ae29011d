//! `ReportService` wires redaction, classification, dedup, lifecycle, routing
//! and the read views into the operations exposed to callers.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::analytics::{AnalyticsMetrics, aggregate};
use crate::classifier::{Classifier, KeywordCollaborator};
use crate::dedup::DedupEngine;
use crate::errors::{ReportError, ReportResult};
use crate::fingerprint::fingerprint;
use crate::lifecycle::{check_transition, requires_organization, stamps_resolution};
use crate::locks::KeyedLocks;
use crate::model::{
    NewReport, OrgReport, PublicReport, Report, ReportStatus, StatusChange, SubmitOutcome,
    Submitter, TrackingView,
};
use crate::notify::{LogNotifier, Notifier};
use crate::redact::redact;
use crate::routing::{Organization, OrganizationDirectory, StaticDirectory};
use crate::store::{ReportStore, StatusUpdate};
use crate::tracking::{self, PublicQuery};

/// Default and maximum page sizes of the organization dashboard.
pub const ORG_REPORTS_DEFAULT_LIMIT: usize = 50;
pub const ORG_REPORTS_MAX_LIMIT: usize = 200;

/// Answer of `generate_ai_insights`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiInsights {
    pub insights: String,
}

pub struct ReportService {
    store: Arc<dyn ReportStore>,
    dedup: DedupEngine,
    classifier: Classifier,
    directory: Arc<dyn OrganizationDirectory>,
    notifier: Arc<dyn Notifier>,
    status_locks: KeyedLocks,
    auto_route: bool,
}

impl ReportService {
    /// Service over `store` with the built-in directory and log notifications.
    pub fn new(store: Arc<dyn ReportStore>, classifier: Classifier) -> Self {
        Self {
            dedup: DedupEngine::new(store.clone()),
            store,
            classifier,
            directory: Arc::new(StaticDirectory::builtin()),
            notifier: Arc::new(LogNotifier),
            status_locks: KeyedLocks::new(),
            auto_route: false,
        }
    }

    pub fn with_directory(mut self, directory: Arc<dyn OrganizationDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Route classified reports right after intake.
    pub fn with_auto_route(mut self, enabled: bool) -> Self {
        self.auto_route = enabled;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Intake: validate, redact, classify, dedup, persist.
    #[instrument(skip_all)]
    pub async fn submit_report(&self, req: NewReport) -> ReportResult<SubmitOutcome> {
        let raw_title = req.title.trim();
        let raw_description = req.description.trim();
        if raw_title.is_empty() {
            return Err(ReportError::Validation("title is required".into()));
        }
        if raw_description.is_empty() {
            return Err(ReportError::Validation("description is required".into()));
        }

        let title = redact(raw_title);
        let description = redact(raw_description);
        let submitter = Submitter::from_fields(req.name.as_deref(), req.email.as_deref());

        let image = req.image.as_deref().filter(|i| !i.trim().is_empty());
        let classification = self.classifier.classify(&title, &description, image).await;
        let result = classification.result;

        let report = Report {
            id: Uuid::new_v4().to_string(),
            fingerprint: fingerprint(raw_title, raw_description, &result.entities),
            title,
            description,
            submitter,
            category: result.category,
            urgency: result.urgency,
            entities: result.entities,
            confidence: result.confidence,
            analysis_result: result.analysis,
            status: if classification.classified {
                ReportStatus::Classified
            } else {
                ReportStatus::Submitted
            },
            organization: None,
            duplicate_of: None,
            duplicate_count: 0,
            submitted_at: Utc::now(),
            resolved_at: None,
        };

        let placement = self.dedup.find_or_create(report).await?;
        let mut stored = placement.stored;

        if self.auto_route && !placement.is_duplicate && stored.status == ReportStatus::Classified {
            match self.update_status(&stored.id, ReportStatus::Routed).await {
                Ok(change) => {
                    stored.status = change.status;
                    stored.organization = change.organization;
                }
                Err(e) => warn!(report_id = %stored.id, error = %e, "auto-routing skipped"),
            }
        }

        info!(
            report_id = %stored.id,
            status = %stored.status,
            category = %stored.category,
            duplicate = placement.is_duplicate,
            anonymous = stored.submitter.is_none(),
            "report submitted"
        );

        Ok(SubmitOutcome {
            category: classification.classified.then(|| stored.category.clone()),
            analysis_result: stored.analysis_result.clone(),
            duplicate_of: stored.duplicate_of.clone(),
            status: stored.status,
            report_id: stored.id,
        })
    }

    /// Applies a lifecycle transition; duplicates redirect to their canonical report.
    #[instrument(skip(self))]
    pub async fn update_status(&self, report_id: &str, to: ReportStatus) -> ReportResult<StatusChange> {
        let report = self
            .store
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(report_id.to_string()))?;
        let canonical_id = report.canonical_id().to_string();
        if canonical_id != report.id {
            debug!(report_id, canonical_id = %canonical_id, "transition redirected to canonical report");
        }

        let _guard = self.status_locks.lock(&canonical_id).await;
        let canonical = self
            .store
            .find_by_id(&canonical_id)
            .await?
            .ok_or_else(|| ReportError::NotFound(canonical_id.clone()))?;

        check_transition(canonical.status, to)?;

        let org = if requires_organization(to) {
            Some(
                self.directory
                    .route(&canonical.category, &canonical.entities)
                    .ok_or_else(|| ReportError::NoRoute(canonical.category.clone()))?,
            )
        } else {
            None
        };
        let resolved_at = stamps_resolution(to).then(|| Utc::now().max(canonical.submitted_at));

        let updated = self
            .store
            .update_status(
                &canonical_id,
                StatusUpdate {
                    status: to,
                    organization: org.as_ref().map(|o| o.name.clone()),
                    resolved_at,
                },
            )
            .await?;

        info!(
            report_id = %updated.id,
            from = %canonical.status,
            to = %updated.status,
            organization = updated.organization.as_deref().unwrap_or("-"),
            "status changed"
        );

        if let Some(org) = &org {
            if let Err(e) = self.notifier.report_routed(&updated, org).await {
                warn!(report_id = %updated.id, organization = %org.name, error = %e, "routing notification failed");
            }
        }

        Ok(StatusChange {
            report_id: updated.id,
            status: updated.status,
            organization: updated.organization,
        })
    }

    /// Anonymous status lookup.
    pub async fn get_report_status(&self, report_id: &str) -> ReportResult<TrackingView> {
        tracking::track(self.store.as_ref(), report_id).await
    }

    /// Canonical reports routed to `org_name`, newest first.
    pub async fn get_org_reports(&self, org_name: &str, limit: Option<usize>) -> ReportResult<Vec<OrgReport>> {
        let org = self
            .directory
            .find(org_name.trim())
            .ok_or_else(|| ReportError::UnknownOrganization(org_name.to_string()))?;
        let limit = limit
            .unwrap_or(ORG_REPORTS_DEFAULT_LIMIT)
            .clamp(1, ORG_REPORTS_MAX_LIMIT);

        let mut reports: Vec<Report> = self
            .store
            .scan()
            .await?
            .into_iter()
            .filter(|r| r.is_canonical())
            .filter(|r| {
                r.organization
                    .as_deref()
                    .is_some_and(|o| o.eq_ignore_ascii_case(&org.name))
            })
            .collect();
        reports.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        Ok(reports
            .iter()
            .take(limit)
            .map(|r| {
                let mut view = OrgReport::from(r);
                view.title = redact(&view.title);
                view.description = redact(&view.description);
                view
            })
            .collect())
    }

    pub async fn get_public_reports(&self, query: &PublicQuery) -> ReportResult<Vec<PublicReport>> {
        tracking::list_public(self.store.as_ref(), query).await
    }

    /// Metrics over a point-in-time snapshot of the store.
    pub async fn get_analytics(&self) -> ReportResult<AnalyticsMetrics> {
        let snapshot = self.store.scan().await?;
        Ok(aggregate(&snapshot))
    }

    /// Narrative over `metrics` (or the current analytics). Failures become text.
    #[instrument(skip_all)]
    pub async fn generate_ai_insights(&self, metrics: Option<AnalyticsMetrics>) -> AiInsights {
        let metrics = match metrics {
            Some(m) => m,
            None => match self.get_analytics().await {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "analytics unavailable for insights");
                    return AiInsights {
                        insights: format!("Insights are unavailable right now: {e}."),
                    };
                }
            },
        };

        match self.classifier.summarize(&metrics).await {
            Ok(text) => AiInsights { insights: text },
            Err(e) => {
                warn!(error = %e, "insight generation failed; using rule-based summary");
                let upstream = ReportError::from(e);
                AiInsights {
                    insights: format!(
                        "AI insights are unavailable right now ({upstream}). Summary: {}",
                        KeywordCollaborator.digest(&metrics)
                    ),
                }
            }
        }
    }

    pub fn list_organizations(&self) -> Vec<Organization> {
        self.directory.organizations()
    }
}
