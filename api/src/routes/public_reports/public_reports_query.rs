use report_core::{PublicQuery, ReportStatus};
use serde::Deserialize;

use crate::error_handler::AppError;

/// `?status=in-progress|resolved&search=..&offset=..`
#[derive(Debug, Default, Deserialize)]
pub struct PublicReportsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl TryFrom<PublicReportsQuery> for PublicQuery {
    type Error = AppError;

    fn try_from(q: PublicReportsQuery) -> Result<Self, Self::Error> {
        let status = match q.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.parse::<ReportStatus>()
                    .map_err(|e| AppError::bad_request("status", e))?,
            ),
        };
        Ok(PublicQuery {
            status,
            search: q.search.filter(|s| !s.trim().is_empty()),
            offset: q.offset.unwrap_or(0),
        })
    }
}
