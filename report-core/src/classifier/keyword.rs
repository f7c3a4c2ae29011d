//! Offline collaborator based on keyword tables.
//!
//! Used when no LLM provider is configured. Deterministic, so identical text
//! always yields identical entities and therefore identical fingerprints.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::AiCollaborator;
use crate::analytics::AnalyticsMetrics;
use crate::errors::AiError;
use crate::model::{ClassificationResult, Entities, Urgency};

/// Category used when no keyword table matches.
pub const GENERAL: &str = "general";

const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    (
        "infrastructure",
        &[
            "pothole", "road", "bridge", "pavement", "sidewalk", "footpath", "drainage",
            "culvert", "traffic light", "building", "collapsed",
        ],
    ),
    (
        "water",
        &["water", "sewage", "sewer", "pipe", "leak", "burst", "borehole"],
    ),
    (
        "utility",
        &[
            "power", "electricity", "outage", "blackout", "street light", "streetlight",
            "transformer", "meter",
        ],
    ),
    (
        "safety",
        &[
            "crime", "theft", "robbery", "mugging", "assault", "unsafe", "violence", "fire",
            "accident", "vandal",
        ],
    ),
    (
        "environment",
        &[
            "garbage", "waste", "trash", "dumping", "litter", "pollution", "smoke", "noise",
            "stagnant",
        ],
    ),
    (
        "health",
        &["hospital", "clinic", "disease", "outbreak", "sanitation", "medicine", "cholera"],
    ),
];

const HIGH_URGENCY: &[&str] = &["emergency", "urgent", "critical", "danger"];
const MEDIUM_URGENCY: &[&str] = &["important"];

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:on|at|near|in|along|outside|opposite)\s+([A-Z][\w'-]*(?:\s+[A-Z][\w'-]*)*)")
        .expect("location regex")
});

static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:[A-Z][\w&'-]*\s+)+(?:Authority|Company|Council|Ministry|Department|Agency|Board|Service))\b",
    )
    .expect("organization regex")
});

#[derive(Debug, Clone, Default)]
pub struct KeywordCollaborator;

impl KeywordCollaborator {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of [`AiCollaborator::classify`].
    pub fn classify_text(&self, text: &str) -> ClassificationResult {
        let lower = text.to_lowercase();

        let (category, hits) = CATEGORY_TABLE
            .iter()
            .map(|(cat, words)| (*cat, words.iter().filter(|w| lower.contains(*w)).count()))
            .fold((GENERAL, 0usize), |best, cur| if cur.1 > best.1 { cur } else { best });

        let urgency = if HIGH_URGENCY.iter().any(|w| lower.contains(w)) {
            Urgency::High
        } else if MEDIUM_URGENCY.iter().any(|w| lower.contains(w)) {
            Urgency::Medium
        } else {
            Urgency::Low
        };

        let confidence = if hits == 0 {
            0.3
        } else {
            (0.5 + 0.1 * hits as f32).min(0.9)
        };

        ClassificationResult {
            category: category.to_string(),
            urgency,
            entities: extract_entities(text),
            confidence: Some(confidence),
            analysis: Some(format!(
                "Keyword match: {hits} {category} term(s); urgency assessed as {urgency}."
            )),
        }
    }

    /// Rule-based narrative over the metrics.
    pub fn digest(&self, m: &AnalyticsMetrics) -> String {
        if m.unique_reports == 0 {
            return "No reports have been submitted yet, so there is nothing to summarize.".into();
        }

        let mut lines = Vec::new();
        if let Some((cat, n)) = m
            .reports_by_category
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        {
            lines.push(format!(
                "Most common issue: {cat} ({n} of {} reports).",
                m.unique_reports
            ));
        }
        lines.push(format!(
            "Resolution rate is {} with an average of {} days to resolve.",
            m.resolution_rate_display(),
            m.avg_resolution_time
        ));
        if let Some(high) = m.reports_by_urgency.get(Urgency::High.as_str()) {
            lines.push(format!("{high} report(s) were marked high urgency."));
        }
        if let Some(peak) = m
            .monthly_trend
            .iter()
            .max_by(|a, b| a.reports.cmp(&b.reports).then_with(|| b.month.cmp(&a.month)))
        {
            lines.push(format!(
                "Busiest month: {} with {} submission(s).",
                peak.month, peak.reports
            ));
        }
        if m.duplicate_reports > 0 {
            lines.push(format!(
                "{} duplicate submission(s) were merged into existing reports.",
                m.duplicate_reports
            ));
        }
        lines.join(" ")
    }
}

fn extract_entities(text: &str) -> Entities {
    let mut entities = Entities::default();
    for cap in ORGANIZATION.captures_iter(text) {
        push_unique(&mut entities.organizations, cap[1].trim());
    }
    for cap in LOCATION.captures_iter(text) {
        let loc = cap[1].trim();
        if !entities.organizations.iter().any(|o| o.contains(loc)) {
            push_unique(&mut entities.locations, loc);
        }
    }
    entities
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !item.is_empty() && !list.iter().any(|x| x.eq_ignore_ascii_case(item)) {
        list.push(item.to_string());
    }
}

#[async_trait]
impl AiCollaborator for KeywordCollaborator {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(
        &self,
        text: &str,
        _image: Option<&str>,
    ) -> Result<ClassificationResult, AiError> {
        Ok(self.classify_text(text))
    }

    async fn summarize(&self, metrics: &AnalyticsMetrics) -> Result<String, AiError> {
        Ok(self.digest(metrics))
    }
}
