use report_core::AnalyticsMetrics;
use serde::Deserialize;

use crate::error_handler::AppError;

/// Optional body of `POST /analytics/insights`; without `metrics` the
/// current analytics are used.
#[derive(Debug, Default, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub metrics: Option<AnalyticsMetrics>,
}

impl InsightsRequest {
    /// Empty or whitespace-only bodies mean "no metrics supplied".
    pub fn from_body(raw: &[u8]) -> Result<Self, AppError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw)
            .map_err(|e| AppError::bad_request("metrics", format!("invalid insights request: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_current_analytics() {
        assert!(InsightsRequest::from_body(b"").unwrap().metrics.is_none());
        assert!(InsightsRequest::from_body(b"  \n").unwrap().metrics.is_none());
        assert!(InsightsRequest::from_body(b"{}").unwrap().metrics.is_none());
    }

    #[test]
    fn partial_metrics_fill_defaults() {
        let req = InsightsRequest::from_body(br#"{"metrics":{"totalReports":4,"uniqueReports":3}}"#).unwrap();
        let m = req.metrics.unwrap();
        assert_eq!(m.total_reports, 4);
        assert_eq!(m.unique_reports, 3);
        assert_eq!(m.resolved_reports, 0);
    }

    #[test]
    fn garbage_is_a_bad_request() {
        assert!(InsightsRequest::from_body(b"{not json").is_err());
    }
}
