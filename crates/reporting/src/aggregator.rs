//! Performance aggregation: per-channel summaries and the month-ordered
//! impressions series behind the performance chart.

use campaign_core::types::{AdType, PerformanceRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::format::parse_month;

/// Totals for one ad-delivery channel.
///
/// A field is `None` when at least one contributing record lacked it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub impressions: Option<u64>,
    pub clicks: Option<u64>,
    pub conversions: Option<u64>,
    /// Unweighted mean of the per-record conversion rates.
    pub conversion_rate: Option<f64>,
    pub record_count: usize,
}

struct SummaryAccumulator {
    impressions: Option<u64>,
    clicks: Option<u64>,
    conversions: Option<u64>,
    rate_sum: Option<f64>,
    count: usize,
}

impl SummaryAccumulator {
    fn new() -> Self {
        Self {
            impressions: Some(0),
            clicks: Some(0),
            conversions: Some(0),
            rate_sum: Some(0.0),
            count: 0,
        }
    }

    fn add(&mut self, record: &PerformanceRecord) {
        self.impressions = add_count(self.impressions, record.impressions);
        self.clicks = add_count(self.clicks, record.clicks);
        self.conversions = add_count(self.conversions, record.conversions);
        self.rate_sum = self
            .rate_sum
            .zip(record.conversion_rate)
            .map(|(sum, rate)| sum + rate);
        self.count += 1;
    }

    fn finish(self) -> CategorySummary {
        CategorySummary {
            impressions: self.impressions,
            clicks: self.clicks,
            conversions: self.conversions,
            conversion_rate: self.rate_sum.map(|sum| sum / self.count as f64),
            record_count: self.count,
        }
    }
}

fn add_count(total: Option<u64>, value: Option<u64>) -> Option<u64> {
    total.zip(value).map(|(t, v)| t.saturating_add(v))
}

/// Summarize records per ad-delivery channel.
///
/// Only channels present in `records` appear in the result; an empty input
/// yields an empty map.
pub fn aggregate_by_category(records: &[PerformanceRecord]) -> BTreeMap<AdType, CategorySummary> {
    let mut accumulators: BTreeMap<AdType, SummaryAccumulator> = BTreeMap::new();
    for record in records {
        accumulators
            .entry(record.ad_type)
            .or_insert_with(SummaryAccumulator::new)
            .add(record);
    }

    accumulators
        .into_iter()
        .map(|(ad_type, acc)| (ad_type, acc.finish()))
        .collect()
}

/// Impressions per channel for one month of the performance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeriesPoint {
    pub month: String,
    impressions: BTreeMap<AdType, Option<u64>>,
}

impl MonthlySeriesPoint {
    fn new(month: String) -> Self {
        Self {
            month,
            impressions: BTreeMap::new(),
        }
    }

    /// Impressions recorded for `ad_type` this month; `None` means no data.
    pub fn impressions(&self, ad_type: AdType) -> Option<u64> {
        self.impressions.get(&ad_type).copied().flatten()
    }

    /// Channels carrying a value on this point.
    pub fn ad_types(&self) -> impl Iterator<Item = AdType> + '_ {
        self.impressions
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(ad_type, _)| *ad_type)
    }
}

/// Serialized flat, one `{ad_type}_impressions` field per channel with data.
impl Serialize for MonthlySeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("month", &self.month)?;
        for (ad_type, value) in &self.impressions {
            if let Some(impressions) = value {
                map.serialize_entry(&ad_type.impressions_key(), impressions)?;
            }
        }
        map.end()
    }
}

/// Build the month-ordered impressions series.
///
/// Records are grouped by their exact month string. A channel repeated within
/// a month keeps the impressions of the last record seen in input order.
/// Points are sorted by calendar month; months that cannot be parsed keep
/// their first-seen order after all dated points. Records without a month
/// are left out of the series.
pub fn build_monthly_series(records: &[PerformanceRecord]) -> Vec<MonthlySeriesPoint> {
    let mut points: Vec<MonthlySeriesPoint> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(month) = record.month.as_deref() else {
            debug!(record_id = %record.id, "Skipping performance record without month");
            continue;
        };
        let slot = *index.entry(month).or_insert_with(|| {
            points.push(MonthlySeriesPoint::new(month.to_string()));
            points.len() - 1
        });
        points[slot]
            .impressions
            .insert(record.ad_type, record.impressions);
    }

    points.sort_by_cached_key(|point| {
        let parsed = parse_month(&point.month);
        (parsed.is_none(), parsed)
    });
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: &str,
        month: &str,
        ad_type: AdType,
        impressions: u64,
        clicks: u64,
        conversions: u64,
        conversion_rate: f64,
    ) -> PerformanceRecord {
        PerformanceRecord {
            id: id.to_string(),
            campaign_id: "camp-1".to_string(),
            month: Some(month.to_string()),
            ad_type,
            impressions: Some(impressions),
            clicks: Some(clicks),
            conversions: Some(conversions),
            conversion_rate: Some(conversion_rate),
            spend: Some(100.0),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(aggregate_by_category(&[]).is_empty());
        assert!(build_monthly_series(&[]).is_empty());
    }

    #[test]
    fn test_conversion_rate_is_simple_mean() {
        let records = vec![
            record("r1", "2024-01", AdType::InApp, 10_000, 100, 2, 2.0),
            record("r2", "2024-02", AdType::InApp, 500, 400, 300, 4.0),
        ];

        let summary = &aggregate_by_category(&records)[&AdType::InApp];
        assert_eq!(summary.conversion_rate, Some(3.0));
        assert_eq!(summary.record_count, 2);
    }

    #[test]
    fn test_aggregation_partitions_totals() {
        let records = vec![
            record("r1", "2024-01", AdType::InApp, 1_200, 40, 4, 1.0),
            record("r2", "2024-01", AdType::WebContextual, 3_400, 90, 9, 2.0),
            record("r3", "2024-02", AdType::InApp, 800, 20, 1, 3.0),
            record("r4", "2024-02", AdType::ArVr, 50, 5, 0, 0.0),
            record("r5", "2024-03", AdType::DigitalOutOfHome, 70_000, 300, 30, 5.0),
        ];

        let summaries = aggregate_by_category(&records);
        assert_eq!(summaries.len(), 4);

        let total = |f: fn(&CategorySummary) -> Option<u64>| -> u64 {
            summaries.values().map(|s| f(s).unwrap()).sum()
        };
        assert_eq!(total(|s| s.impressions), 1_200 + 3_400 + 800 + 50 + 70_000);
        assert_eq!(total(|s| s.clicks), 40 + 90 + 20 + 5 + 300);
        assert_eq!(total(|s| s.conversions), 4 + 9 + 1 + 30);
        assert_eq!(summaries[&AdType::InApp].impressions, Some(2_000));
    }

    #[test]
    fn test_missing_field_poisons_only_that_metric() {
        let mut broken = record("r2", "2024-01", AdType::InApp, 0, 10, 1, 2.0);
        broken.impressions = None;
        broken.conversion_rate = None;
        let records = vec![record("r1", "2024-01", AdType::InApp, 100, 10, 1, 4.0), broken];

        let summary = &aggregate_by_category(&records)[&AdType::InApp];
        assert_eq!(summary.impressions, None);
        assert_eq!(summary.conversion_rate, None);
        assert_eq!(summary.clicks, Some(20));
    }

    #[test]
    fn test_series_sorted_by_calendar_month() {
        let records = vec![
            record("r1", "2024-03", AdType::InApp, 300, 0, 0, 0.0),
            record("r2", "2023-11", AdType::InApp, 100, 0, 0, 0.0),
            record("r3", "2024-01", AdType::ArVr, 200, 0, 0, 0.0),
        ];

        let months: Vec<_> = build_monthly_series(&records)
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec!["2023-11", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_series_duplicate_month_category_last_write_wins() {
        let records = vec![
            record("r1", "2024-01", AdType::InApp, 100, 0, 0, 0.0),
            record("r2", "2024-01", AdType::WebContextual, 50, 0, 0, 0.0),
            record("r3", "2024-01", AdType::InApp, 700, 0, 0, 0.0),
        ];

        let series = build_monthly_series(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].impressions(AdType::InApp), Some(700));
        assert_eq!(series[0].impressions(AdType::WebContextual), Some(50));
        assert_eq!(series[0].impressions(AdType::ArVr), None);
    }

    #[test]
    fn test_series_point_omits_absent_categories() {
        let records = vec![
            record("r1", "2024-01", AdType::InApp, 1_200, 0, 0, 0.0),
            record("r2", "2024-02", AdType::DigitalOutOfHome, 900, 0, 0, 0.0),
        ];

        let json = serde_json::to_value(build_monthly_series(&records)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"month": "2024-01", "in-app_impressions": 1200},
                {"month": "2024-02", "d-ooh_impressions": 900}
            ])
        );
    }

    #[test]
    fn test_series_groups_by_exact_month_string() {
        let records = vec![
            record("r1", "2024-01", AdType::InApp, 1, 0, 0, 0.0),
            record("r2", "2024-01-01", AdType::InApp, 2, 0, 0, 0.0),
        ];

        let series = build_monthly_series(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, "2024-01");
        assert_eq!(series[1].month, "2024-01-01");
    }

    #[test]
    fn test_series_unparseable_months_sort_last() {
        let undated = record("r1", "sometime", AdType::InApp, 5, 0, 0, 0.0);
        let mut no_month = record("r3", "", AdType::ArVr, 9, 0, 0, 0.0);
        no_month.month = None;
        let records = vec![
            undated,
            record("r2", "2024-02", AdType::InApp, 6, 0, 0, 0.0),
            no_month,
        ];

        let months: Vec<_> = build_monthly_series(&records)
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec!["2024-02", "sometime"]);
    }
}
