//! Civic report intake engine.
//!
//! Submissions flow through redaction, classification and fingerprint
//! deduplication into a [`store::ReportStore`]; the lifecycle manager moves
//! canonical reports from `submitted` to `resolved`, and the analytics and
//! tracking views read the same store on demand. [`service::ReportService`]
//! is the entry point used by the HTTP layer.

pub mod analytics;
pub mod classifier;
pub mod dedup;
pub mod errors;
pub mod fingerprint;
pub mod lifecycle;
pub mod locks;
pub mod model;
pub mod notify;
pub mod redact;
pub mod routing;
pub mod service;
pub mod store;
pub mod tracking;

pub use analytics::{AnalyticsMetrics, MonthlyPoint};
pub use classifier::{AiCollaborator, Classifier, DEFAULT_AI_TIMEOUT, KeywordCollaborator};
pub use errors::{AiError, DirectoryError, NotifyError, ReportError, ReportResult, StoreError};
pub use model::{
    ClassificationResult, Entities, NewReport, OrgReport, PublicReport, Report, ReportStatus,
    StatusChange, SubmitOutcome, TrackingView, Urgency,
};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use routing::{Organization, OrganizationDirectory, StaticDirectory};
pub use service::{AiInsights, ReportService};
pub use tracking::{PUBLIC_PAGE_SIZE, PublicQuery};

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::analytics::AnalyticsMetrics;
    use crate::classifier::AiCollaborator;
    use crate::errors::AiError;
    use crate::model::{ClassificationResult, Entities, Report, ReportStatus, Urgency};

    /// Canonical `submitted` report with fixed text.
    pub fn report(id: &str, fingerprint: &str) -> Report {
        Report {
            id: id.to_string(),
            title: format!("Report {id}"),
            description: "Water pooling next to the bus stop".to_string(),
            submitter: None,
            category: "infrastructure".to_string(),
            urgency: Urgency::Medium,
            entities: Entities::default(),
            confidence: None,
            analysis_result: None,
            status: ReportStatus::Submitted,
            organization: None,
            fingerprint: fingerprint.to_string(),
            duplicate_of: None,
            duplicate_count: 0,
            submitted_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Always answers with the same classification.
    pub struct StaticAi(ClassificationResult);

    impl StaticAi {
        pub fn new(result: ClassificationResult) -> Self {
            Self(result)
        }
    }

    #[async_trait]
    impl AiCollaborator for StaticAi {
        fn name(&self) -> &str {
            "static"
        }

        async fn classify(&self, _: &str, _: Option<&str>) -> Result<ClassificationResult, AiError> {
            Ok(self.0.clone())
        }

        async fn summarize(&self, m: &AnalyticsMetrics) -> Result<String, AiError> {
            Ok(format!("{} reports", m.total_reports))
        }
    }

    pub struct FailingAi;

    #[async_trait]
    impl AiCollaborator for FailingAi {
        fn name(&self) -> &str {
            "failing"
        }

        async fn classify(&self, _: &str, _: Option<&str>) -> Result<ClassificationResult, AiError> {
            Err(AiError::Unavailable("connection refused".into()))
        }

        async fn summarize(&self, _: &AnalyticsMetrics) -> Result<String, AiError> {
            Err(AiError::Unavailable("connection refused".into()))
        }
    }

    /// Sleeps before answering.
    pub struct SlowAi(pub Duration);

    #[async_trait]
    impl AiCollaborator for SlowAi {
        fn name(&self) -> &str {
            "slow"
        }

        async fn classify(&self, _: &str, _: Option<&str>) -> Result<ClassificationResult, AiError> {
            tokio::time::sleep(self.0).await;
            Ok(crate::classifier::default_result())
        }

        async fn summarize(&self, _: &AnalyticsMetrics) -> Result<String, AiError> {
            tokio::time::sleep(self.0).await;
            Ok("late".into())
        }
    }
}
