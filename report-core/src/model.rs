//! Report data model and the read views handed to callers.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned when classification could not run.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Workflow status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Submitted,
    Classified,
    Routed,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Submitted,
        ReportStatus::Classified,
        ReportStatus::Routed,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ];

    /// Wire name (`in-progress`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Submitted => "submitted",
            ReportStatus::Classified => "classified",
            ReportStatus::Routed => "routed",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Statuses visible in the public transparency listing.
    pub fn is_public(self) -> bool {
        matches!(self, ReportStatus::InProgress | ReportStatus::Resolved)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ReportStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == normalized)
            .ok_or_else(|| format!("unknown status `{s}`"))
    }
}

/// Urgency level assigned by the classifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            other => Err(format!("unknown urgency `{other}`")),
        }
    }
}

/// Contact details of a non-anonymous submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Submitter {
    /// Builds a submitter from optional form fields.
    ///
    /// Blank strings count as absent; `None` means the report is anonymous.
    pub fn from_fields(name: Option<&str>, email: Option<&str>) -> Option<Self> {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let name = clean(name);
        let email = clean(email);
        if name.is_none() && email.is_none() {
            None
        } else {
            Some(Self { name, email })
        }
    }
}

/// Structured extraction attached by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.organizations.is_empty()
    }
}

/// Persisted report.
///
/// `title` and `description` are always the redacted text. `duplicate_of`
/// points at the canonical report of the fingerprint cluster; duplicates carry
/// a copy of the canonical status taken at insert time, readers resolve the
/// live value through the canonical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub description: String,
    pub submitter: Option<Submitter>,
    pub category: String,
    pub urgency: Urgency,
    pub entities: Entities,
    pub confidence: Option<f32>,
    pub analysis_result: Option<String>,
    pub status: ReportStatus,
    pub organization: Option<String>,
    pub fingerprint: String,
    pub duplicate_of: Option<String>,
    pub duplicate_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    pub fn is_canonical(&self) -> bool {
        self.duplicate_of.is_none()
    }

    /// Id of the report that owns status and organization for this one.
    pub fn canonical_id(&self) -> &str {
        self.duplicate_of.as_deref().unwrap_or(&self.id)
    }
}

/// Intake request as received from a citizen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Base64 image payload forwarded to the AI collaborator only.
    #[serde(default)]
    pub image: Option<String>,
}

/// Result produced by a classifier collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub analysis: Option<String>,
}

/// Outcome of `submit_report`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub report_id: String,
    pub status: ReportStatus,
    pub category: Option<String>,
    pub analysis_result: Option<String>,
    /// Canonical report id when the submission was recorded as a duplicate.
    pub duplicate_of: Option<String>,
}

/// Outcome of `update_status`; `report_id` is the canonical report that changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub report_id: String,
    pub status: ReportStatus,
    pub organization: Option<String>,
}

/// Anonymous tracking answer: never carries text or submitter data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingView {
    pub status: ReportStatus,
    pub category: String,
    pub urgency: Urgency,
}

/// Redacted record for the public transparency listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: Urgency,
    pub status: ReportStatus,
    pub organization: Option<String>,
    pub locations: Vec<String>,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Record shown to the organization a report was routed to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgReport {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: Urgency,
    pub status: ReportStatus,
    pub entities: Entities,
    pub submitter: Option<Submitter>,
    pub duplicate_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<&Report> for OrgReport {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id.clone(),
            title: r.title.clone(),
            description: r.description.clone(),
            category: r.category.clone(),
            urgency: r.urgency,
            status: r.status,
            entities: r.entities.clone(),
            submitter: r.submitter.clone(),
            duplicate_count: r.duplicate_count,
            submitted_at: r.submitted_at,
            resolved_at: r.resolved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_wire_names() {
        assert_eq!(
            "in-progress".parse::<ReportStatus>(),
            Ok(ReportStatus::InProgress)
        );
        assert_eq!(
            "IN_PROGRESS".parse::<ReportStatus>(),
            Ok(ReportStatus::InProgress)
        );
        assert!("closed".parse::<ReportStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ReportStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn blank_contact_fields_mean_anonymous() {
        assert_eq!(Submitter::from_fields(Some("  "), Some("")), None);
        assert_eq!(Submitter::from_fields(None, None), None);
        let s = Submitter::from_fields(Some("Amina"), None).unwrap();
        assert_eq!(s.name.as_deref(), Some("Amina"));
        assert_eq!(s.email, None);
    }

    #[test]
    fn only_late_statuses_are_public() {
        let public: Vec<_> = ReportStatus::ALL
            .into_iter()
            .filter(|s| s.is_public())
            .collect();
        assert_eq!(public, vec![ReportStatus::InProgress, ReportStatus::Resolved]);
    }
}
