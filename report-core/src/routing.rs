//! Organization registry and the routing decision.
//!
//! Routing is a pure function of the report's category and entities:
//! category + location match first, then category only, then the fallback
//! organization of the directory.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::DirectoryError;
use crate::fingerprint::normalize;
use crate::model::Entities;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    /// `government`, `utility`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    /// Report categories this organization handles.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Areas served; empty means everywhere.
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub facilities: Vec<String>,
}

impl Organization {
    fn handles(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    fn serves_any(&self, locations: &[String]) -> bool {
        self.locations.iter().any(|served| {
            let served = normalize(served);
            locations.iter().any(|l| {
                let l = normalize(l);
                !l.is_empty() && (l.contains(&served) || served.contains(&l))
            })
        })
    }
}

/// Organization registry consulted by the lifecycle manager.
pub trait OrganizationDirectory: Send + Sync {
    /// Organization responsible for a report, if any.
    fn route(&self, category: &str, entities: &Entities) -> Option<Organization>;

    fn organizations(&self) -> Vec<Organization>;

    fn find(&self, name: &str) -> Option<Organization> {
        self.organizations()
            .into_iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    fallback: Option<String>,
    organizations: Vec<Organization>,
}

/// Directory held in memory, loaded once at start.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    orgs: Vec<Organization>,
    fallback: Option<usize>,
}

impl StaticDirectory {
    pub fn new(orgs: Vec<Organization>, fallback: Option<&str>) -> Result<Self, DirectoryError> {
        if orgs.is_empty() {
            return Err(DirectoryError::Empty);
        }
        let fallback = match fallback {
            Some(name) => Some(
                orgs.iter()
                    .position(|o| o.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| DirectoryError::UnknownFallback(name.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { orgs, fallback })
    }

    pub fn from_json(raw: &str) -> Result<Self, DirectoryError> {
        let file: DirectoryFile = serde_json::from_str(raw)?;
        Self::new(file.organizations, file.fallback.as_deref())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dir = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            organizations = dir.orgs.len(),
            "organization directory loaded"
        );
        Ok(dir)
    }

    /// Municipal directory used when no file is configured.
    pub fn builtin() -> Self {
        let org = |name: &str, kind: &str, email: &str, cats: &[&str], facilities: &[&str]| {
            Organization {
                name: name.to_string(),
                kind: kind.to_string(),
                contact_email: Some(email.to_string()),
                categories: cats.iter().map(|c| c.to_string()).collect(),
                locations: Vec::new(),
                facilities: facilities.iter().map(|f| f.to_string()).collect(),
            }
        };
        let orgs = vec![
            org(
                "Municipal Public Works",
                "government",
                "publicworks@city.gov",
                &["infrastructure"],
                &["Roads Department", "Infrastructure Maintenance"],
            ),
            org(
                "City Water Department",
                "utility",
                "water@city.gov",
                &["water", "sanitation"],
                &["Water Treatment Plant A", "Distribution Center"],
            ),
            org(
                "City Power Company",
                "utility",
                "support@citypower.com",
                &["utility", "electricity", "power"],
                &["Power Station 1", "Grid Control Center"],
            ),
            org(
                "Department of Public Safety",
                "government",
                "safety@city.gov",
                &["safety", "health"],
                &["Emergency Response Center"],
            ),
            org(
                "Waste Management Services",
                "utility",
                "info@wastemanagement.com",
                &["environment", "waste"],
                &["Collection Center", "Recycling Plant"],
            ),
        ];
        Self {
            orgs,
            fallback: Some(0),
        }
    }

    pub fn fallback(&self) -> Option<&Organization> {
        self.fallback.map(|i| &self.orgs[i])
    }
}

impl OrganizationDirectory for StaticDirectory {
    fn route(&self, category: &str, entities: &Entities) -> Option<Organization> {
        let handling: Vec<&Organization> =
            self.orgs.iter().filter(|o| o.handles(category)).collect();

        handling
            .iter()
            .find(|o| o.serves_any(&entities.locations))
            .or_else(|| handling.iter().find(|o| o.locations.is_empty()))
            .or_else(|| handling.first())
            .copied()
            .or_else(|| self.fallback())
            .cloned()
    }

    fn organizations(&self) -> Vec<Organization> {
        self.orgs.clone()
    }
}
