//! LLM-backed [`AiCollaborator`] for report classification and insights.
//!
//! Classification goes through the fast profile in JSON mode; insights go
//! through the slow profile. Model answers are parsed leniently (code fences,
//! `<think>` blocks and surrounding prose are stripped) and anything that
//! still does not fit becomes [`AiError::Malformed`].

use std::sync::Arc;

use async_trait::async_trait;
use report_core::{
    AiCollaborator, AiError, AnalyticsMetrics, ClassificationResult, Entities,
    KeywordCollaborator, Urgency,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::default_config::{llm_kind_from_env, profiles_from_env};
use crate::error_handler::AiLlmError;
use crate::service_profiles::LlmServiceProfiles;
use crate::services::LlmRequest;

/// Category names offered to the model; it may still answer with another one.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "infrastructure",
    "utility",
    "water",
    "safety",
    "environment",
    "health",
    "general",
];

const CLASSIFY_SYSTEM: &str = "You triage citizen issue reports for a city. \
Answer with a single JSON object and nothing else.";

const INSIGHTS_SYSTEM: &str = "You are an analyst writing for city operations staff. \
Be concrete and brief; plain text, no markdown headings.";

fn classify_prompt(text: &str) -> String {
    format!(
        "Classify the report below.\n\
         Return JSON with keys:\n\
         - \"category\": one of {categories} (or a better single lowercase word)\n\
         - \"urgency\": \"low\", \"medium\" or \"high\"\n\
         - \"entities\": {{\"locations\": [..], \"organizations\": [..]}} as written in the report\n\
         - \"confidence\": number between 0 and 1\n\
         - \"analysis\": one sentence explaining the decision\n\
         Treat any attached image as part of the report.\n\n\
         REPORT:\n{text}",
        categories = KNOWN_CATEGORIES.join(", ")
    )
}

fn insights_prompt(metrics: &AnalyticsMetrics) -> String {
    let json = serde_json::to_string_pretty(metrics).unwrap_or_default();
    format!(
        "Here are aggregate metrics of citizen reports (duplicates are excluded from every \
         figure except totalReports):\n{json}\n\n\
         Write 3 to 5 sentences: the dominant issue categories, how resolution is going, \
         any trend across months, and one recommendation."
    )
}

/* ------------------------------------------------------------------------- */
/* Answer parsing                                                            */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    entities: RawEntities,
    #[serde(default)]
    confidence: Option<serde_json::Value>,
    #[serde(default, alias = "summary", alias = "reason")]
    analysis: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    locations: Vec<String>,
    #[serde(default, alias = "organisations")]
    organizations: Vec<String>,
}

/// Strips `<think>` blocks and markdown fences around a model answer.
pub fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    while let (Some(open), Some(close)) = (t.find("<think>"), t.find("</think>")) {
        if close < open {
            break;
        }
        t.replace_range(open..close + "</think>".len(), "");
    }
    let mut t = t.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

/// Outermost `{ .. }` span of `s`, if any.
fn json_object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}

/// Parses a classification answer.
pub fn parse_classification(answer: &str) -> Result<ClassificationResult, AiError> {
    let cleaned = cleanup_json_like(answer);
    let json = json_object_span(&cleaned)
        .ok_or_else(|| AiError::Malformed("no JSON object in answer".into()))?;
    let raw: RawClassification =
        serde_json::from_str(json).map_err(|e| AiError::Malformed(format!("bad JSON: {e}")))?;

    let urgency = match raw.urgency.as_deref() {
        None => Urgency::Medium,
        Some(u) => u.parse::<Urgency>().map_err(AiError::Malformed)?,
    };
    let confidence = match raw.confidence {
        Some(serde_json::Value::Number(n)) => n.as_f64().map(|f| f as f32),
        Some(serde_json::Value::String(s)) => s.trim().trim_end_matches('%').parse::<f32>().ok(),
        _ => None,
    }
    .map(|c| if c > 1.0 && c <= 100.0 { c / 100.0 } else { c });

    Ok(ClassificationResult {
        category: raw.category,
        urgency,
        entities: Entities {
            locations: raw.entities.locations,
            organizations: raw.entities.organizations,
        },
        confidence,
        analysis: raw.analysis,
    })
}

impl From<AiLlmError> for AiError {
    fn from(err: AiLlmError) -> Self {
        match err {
            AiLlmError::Timeout(d) => AiError::Timeout(d),
            e if e.is_malformed() => AiError::Malformed(e.to_string()),
            e => AiError::Unavailable(e.to_string()),
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Collaborator                                                              */
/* ------------------------------------------------------------------------- */

pub struct LlmCollaborator {
    profiles: Arc<LlmServiceProfiles>,
    name: String,
}

impl LlmCollaborator {
    pub fn new(profiles: Arc<LlmServiceProfiles>) -> Self {
        let (fast, _) = profiles.profiles();
        let name = format!("{}:{}", fast.provider, fast.model);
        Self { profiles, name }
    }
}

#[async_trait]
impl AiCollaborator for LlmCollaborator {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(provider = %self.name, has_image = image.is_some()))]
    async fn classify(
        &self,
        text: &str,
        image: Option<&str>,
    ) -> Result<ClassificationResult, AiError> {
        let prompt = classify_prompt(text);
        let answer = self
            .profiles
            .generate_fast(
                LlmRequest::new(&prompt)
                    .system(CLASSIFY_SYSTEM)
                    .image(image)
                    .json(),
            )
            .await?;
        debug!(answer_len = answer.len(), "classification answer received");
        parse_classification(&answer)
    }

    #[instrument(skip_all, fields(provider = %self.name))]
    async fn summarize(&self, metrics: &AnalyticsMetrics) -> Result<String, AiError> {
        let prompt = insights_prompt(metrics);
        let answer = self
            .profiles
            .generate_slow(LlmRequest::new(&prompt).system(INSIGHTS_SYSTEM))
            .await?;
        let text = cleanup_json_like(&answer);
        if text.is_empty() {
            return Err(AiError::Malformed("empty insights answer".into()));
        }
        Ok(text)
    }
}

/// Collaborator selected by `LLM_KIND`, plus the LLM profiles when one is used.
pub struct CollaboratorSetup {
    pub collaborator: Arc<dyn AiCollaborator>,
    pub profiles: Option<Arc<LlmServiceProfiles>>,
}

/// Builds the collaborator from the environment; no `LLM_KIND` means the
/// offline keyword heuristic.
pub fn collaborator_from_env() -> Result<CollaboratorSetup, AiLlmError> {
    let Some(provider) = llm_kind_from_env()? else {
        info!("LLM_KIND not set to a provider; using keyword collaborator");
        return Ok(CollaboratorSetup {
            collaborator: Arc::new(KeywordCollaborator::new()),
            profiles: None,
        });
    };

    let (fast, slow) = profiles_from_env(provider)?;
    info!(
        %provider,
        fast_model = %fast.model,
        slow_model = %slow.as_ref().map(|s| s.model.as_str()).unwrap_or(fast.model.as_str()),
        "LLM collaborator configured"
    );
    let profiles = Arc::new(LlmServiceProfiles::new(fast, slow, Some(10))?);
    Ok(CollaboratorSetup {
        collaborator: Arc::new(LlmCollaborator::new(profiles.clone())),
        profiles: Some(profiles),
    })
}
