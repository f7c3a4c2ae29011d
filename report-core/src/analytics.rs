//! Aggregate metrics over the report corpus.
//!
//! Duplicates only contribute to `totalReports`; every other figure counts
//! canonical reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Report, ReportStatus};

/// One calendar month of the trend, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub reports: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsMetrics {
    pub total_reports: u64,
    pub unique_reports: u64,
    pub duplicate_reports: u64,
    pub resolved_reports: u64,
    /// Mean whole days from submission to resolution, one decimal.
    pub avg_resolution_time: f64,
    /// `resolvedReports / uniqueReports` as a percentage, one decimal.
    pub resolution_rate: f64,
    pub reports_by_category: BTreeMap<String, u64>,
    pub reports_by_urgency: BTreeMap<String, u64>,
    pub reports_by_status: BTreeMap<String, u64>,
    pub monthly_trend: Vec<MonthlyPoint>,
}

impl AnalyticsMetrics {
    /// Operator-facing resolution rate, `0%` on an empty corpus.
    pub fn resolution_rate_display(&self) -> String {
        if self.unique_reports == 0 {
            "0%".to_string()
        } else {
            format!("{}%", self.resolution_rate)
        }
    }
}

fn month_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Computes metrics over a snapshot of reports.
pub fn aggregate(reports: &[Report]) -> AnalyticsMetrics {
    let mut m = AnalyticsMetrics {
        total_reports: reports.len() as u64,
        ..Default::default()
    };

    let mut months: BTreeMap<String, MonthlyPoint> = BTreeMap::new();
    let mut resolved_in: BTreeMap<String, u64> = BTreeMap::new();
    let mut resolution_days: Vec<i64> = Vec::new();

    for r in reports.iter().filter(|r| r.is_canonical()) {
        m.unique_reports += 1;
        *m.reports_by_category.entry(r.category.clone()).or_default() += 1;
        *m.reports_by_urgency
            .entry(r.urgency.as_str().to_string())
            .or_default() += 1;
        *m.reports_by_status
            .entry(r.status.as_str().to_string())
            .or_default() += 1;

        let key = month_key(r.submitted_at);
        months
            .entry(key.clone())
            .or_insert_with(|| MonthlyPoint {
                month: key,
                reports: 0,
                resolved: 0,
            })
            .reports += 1;

        if r.status == ReportStatus::Resolved {
            m.resolved_reports += 1;
            if let Some(done) = r.resolved_at {
                resolution_days.push((done - r.submitted_at).num_days().max(0));
                *resolved_in.entry(month_key(done)).or_default() += 1;
            }
        }
    }

    m.duplicate_reports = m.total_reports - m.unique_reports;

    if !resolution_days.is_empty() {
        let sum: i64 = resolution_days.iter().sum();
        m.avg_resolution_time = round1(sum as f64 / resolution_days.len() as f64);
    }
    if m.unique_reports > 0 {
        m.resolution_rate = round1(m.resolved_reports as f64 * 100.0 / m.unique_reports as f64);
    }

    // Trend covers months with at least one submission.
    for (month, n) in resolved_in {
        if let Some(point) = months.get_mut(&month) {
            point.resolved = n;
        }
    }
    m.monthly_trend = months.into_values().collect();
    m
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::model::Urgency;
    use crate::test_support::report;

    fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn empty_corpus_has_zero_everything() {
        let m = aggregate(&[]);
        assert_eq!(m, AnalyticsMetrics::default());
        assert_eq!(m.avg_resolution_time, 0.0);
        assert_eq!(m.resolution_rate_display(), "0%");
    }

    #[test]
    fn duplicates_only_count_towards_total() {
        let a = report("a", "fp1");
        let mut b = report("b", "fp1");
        b.duplicate_of = Some("a".into());
        b.category = "should-not-count".into();

        let m = aggregate(&[a, b]);
        assert_eq!(m.total_reports, 2);
        assert_eq!(m.unique_reports, 1);
        assert_eq!(m.duplicate_reports, 1);
        assert_eq!(m.unique_reports + m.duplicate_reports, m.total_reports);
        assert!(!m.reports_by_category.contains_key("should-not-count"));
    }

    #[test]
    fn resolution_time_is_mean_of_whole_days() {
        let mut a = report("a", "fp1");
        a.submitted_at = at(2025, 3, 1);
        a.status = ReportStatus::Resolved;
        a.resolved_at = Some(a.submitted_at + Duration::days(2) + Duration::hours(20));

        let mut b = report("b", "fp2");
        b.submitted_at = at(2025, 3, 5);
        b.status = ReportStatus::Resolved;
        b.resolved_at = Some(at(2025, 3, 10));

        let c = report("c", "fp3");

        let m = aggregate(&[a, b, c]);
        assert_eq!(m.resolved_reports, 2);
        // (2 + 5) / 2
        assert_eq!(m.avg_resolution_time, 3.5);
        assert_eq!(m.resolution_rate, 66.7);
        assert_eq!(m.resolution_rate_display(), "66.7%");
    }

    #[test]
    fn breakdowns_use_wire_names() {
        let mut a = report("a", "fp1");
        a.status = ReportStatus::InProgress;
        a.urgency = Urgency::High;
        a.category = "utility".into();
        let m = aggregate(&[a]);
        assert_eq!(m.reports_by_status.get("in-progress"), Some(&1));
        assert_eq!(m.reports_by_urgency.get("high"), Some(&1));
        assert_eq!(m.reports_by_category.get("utility"), Some(&1));
    }

    #[test]
    fn monthly_trend_is_ascending_and_counts_resolution_month() {
        let mut jan = report("a", "fp1");
        jan.submitted_at = at(2025, 1, 20);
        jan.status = ReportStatus::Resolved;
        jan.resolved_at = Some(at(2025, 2, 3));

        let mut feb = report("b", "fp2");
        feb.submitted_at = at(2025, 2, 1);

        let mut dec = report("c", "fp3");
        dec.submitted_at = at(2024, 12, 31);

        let m = aggregate(&[feb, jan, dec]);
        let months: Vec<_> = m.monthly_trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
        assert_eq!(m.monthly_trend[1].reports, 1);
        assert_eq!(m.monthly_trend[1].resolved, 0);
        assert_eq!(m.monthly_trend[2].reports, 1);
        assert_eq!(m.monthly_trend[2].resolved, 1);
    }

    #[test]
    fn serializes_in_camel_case() {
        let json = serde_json::to_value(aggregate(&[report("a", "fp")])).unwrap();
        assert_eq!(json["uniqueReports"], 1);
        assert!(json["monthlyTrend"].is_array());
        assert!(json["avgResolutionTime"].is_number());
    }
}
