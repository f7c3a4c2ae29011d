//! Report classification with a fail-soft AI collaborator.
//!
//! The collaborator is a capability interface: it may be a remote LLM, the
//! local keyword heuristic, or absent. Every call is bounded by a timeout;
//! any failure yields the default classification (`uncategorized`, `medium`)
//! and the report stays `submitted`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::analytics::AnalyticsMetrics;
use crate::errors::AiError;
use crate::model::{ClassificationResult, Entities, UNCATEGORIZED, Urgency};

pub mod keyword;

pub use keyword::KeywordCollaborator;

/// Default bound on a single collaborator call.
pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_secs(20);

/// External classifier/summarizer.
#[async_trait]
pub trait AiCollaborator: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Classifies report text, optionally looking at a base64 image.
    async fn classify(
        &self,
        text: &str,
        image: Option<&str>,
    ) -> Result<ClassificationResult, AiError>;

    /// Writes a short narrative over aggregate metrics.
    async fn summarize(&self, metrics: &AnalyticsMetrics) -> Result<String, AiError>;
}

/// What the classifier decided for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub result: ClassificationResult,
    /// `false` when the defaults were applied.
    pub classified: bool,
    /// Why the collaborator result was not used.
    pub failure: Option<String>,
}

impl Classification {
    fn fallback(reason: String) -> Self {
        Self {
            result: default_result(),
            classified: false,
            failure: Some(reason),
        }
    }
}

pub fn default_result() -> ClassificationResult {
    ClassificationResult {
        category: UNCATEGORIZED.to_string(),
        urgency: Urgency::Medium,
        entities: Entities::default(),
        confidence: None,
        analysis: None,
    }
}

/// Classification front-end used by intake.
#[derive(Clone)]
pub struct Classifier {
    collaborator: Option<Arc<dyn AiCollaborator>>,
    timeout: Duration,
}

impl Classifier {
    pub fn new(collaborator: Arc<dyn AiCollaborator>, timeout: Duration) -> Self {
        Self {
            collaborator: Some(collaborator),
            timeout,
        }
    }

    /// Classifier that always applies the defaults.
    pub fn disabled() -> Self {
        Self {
            collaborator: None,
            timeout: DEFAULT_AI_TIMEOUT,
        }
    }

    pub fn collaborator(&self) -> Option<&Arc<dyn AiCollaborator>> {
        self.collaborator.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classifies already-redacted report text. Never fails.
    #[instrument(skip_all, fields(has_image = image.is_some()))]
    pub async fn classify(&self, title: &str, description: &str, image: Option<&str>) -> Classification {
        let Some(ai) = &self.collaborator else {
            return Classification::fallback(AiError::NotConfigured.to_string());
        };

        let text = format!("{title}\n\n{description}");
        let outcome = match tokio::time::timeout(self.timeout, ai.classify(&text, image)).await {
            Ok(res) => res.and_then(sanitize),
            Err(_) => Err(AiError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(result) => {
                debug!(
                    provider = ai.name(),
                    category = %result.category,
                    urgency = %result.urgency,
                    locations = result.entities.locations.len(),
                    "report classified"
                );
                Classification {
                    result,
                    classified: true,
                    failure: None,
                }
            }
            Err(err) => {
                warn!(provider = ai.name(), error = %err, "classification failed; applying defaults");
                Classification::fallback(err.to_string())
            }
        }
    }

    /// Asks the collaborator for an insight narrative, bounded by the timeout.
    pub async fn summarize(&self, metrics: &AnalyticsMetrics) -> Result<String, AiError> {
        let ai = self.collaborator.as_ref().ok_or(AiError::NotConfigured)?;
        let text = tokio::time::timeout(self.timeout, ai.summarize(metrics))
            .await
            .map_err(|_| AiError::Timeout(self.timeout))??;
        let text = text.trim();
        if text.is_empty() {
            return Err(AiError::Malformed("empty summary".into()));
        }
        Ok(text.to_string())
    }
}

/// Normalizes a collaborator result; rejects unusable answers.
fn sanitize(mut result: ClassificationResult) -> Result<ClassificationResult, AiError> {
    let category = result.category.trim().to_lowercase();
    if category.is_empty() {
        return Err(AiError::Malformed("empty category".into()));
    }
    result.category = category;
    result.entities.locations = clean_list(result.entities.locations);
    result.entities.organizations = clean_list(result.entities.organizations);
    result.confidence = result
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0));
    result.analysis = result
        .analysis
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());
    Ok(result)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.split_whitespace().collect::<Vec<_>>().join(" ");
        if !item.is_empty() && !out.iter().any(|o| o.eq_ignore_ascii_case(&item)) {
            out.push(item);
        }
    }
    out
}
