use serde::Deserialize;

/// `?limit=` of the organization dashboard; default 50, clamped to 1..=200.
#[derive(Debug, Default, Deserialize)]
pub struct OrgReportsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}
