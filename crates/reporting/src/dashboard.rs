//! Campaign performance dashboard: per-channel cards and the performance chart.

use campaign_core::error::CampaignResult;
use campaign_core::source::PerformanceSource;
use campaign_core::types::{AdType, CampaignId, PerformanceRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::aggregator::{aggregate_by_category, build_monthly_series, CategorySummary, MonthlySeriesPoint};
use crate::format::{format_count, format_magnitude, format_month, format_rate};

/// Formatted values shown on a channel card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardMetrics {
    pub impressions: String,
    pub clicks: String,
    pub conversion_rate: String,
    pub conversions: String,
}

impl CardMetrics {
    fn from_summary(summary: &CategorySummary) -> Self {
        Self {
            impressions: format_count(summary.impressions),
            clicks: format_count(summary.clicks),
            conversion_rate: format_rate(summary.conversion_rate),
            conversions: format_count(summary.conversions),
        }
    }
}

/// One dashboard card per ad-delivery channel. `metrics` is `None` when the
/// channel has no records ("No data available").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCard {
    pub ad_type: AdType,
    pub name: &'static str,
    pub color: &'static str,
    pub summary: Option<CategorySummary>,
    pub metrics: Option<CardMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub ad_type: AdType,
    pub name: &'static str,
    pub color: &'static str,
    pub data_key: String,
}

/// Data behind the "Performance Across Platform" line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceChart {
    pub points: Vec<MonthlySeriesPoint>,
    pub month_labels: Vec<String>,
    pub legend: Vec<LegendEntry>,
    /// Y-axis label for the largest plotted value.
    pub y_axis_max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub cards: Vec<CategoryCard>,
    pub chart: PerformanceChart,
    pub record_count: usize,
}

impl DashboardView {
    /// Build the view from an already-fetched set of records.
    pub fn from_records(records: &[PerformanceRecord]) -> Self {
        let mut summaries = aggregate_by_category(records);
        let points = build_monthly_series(records);

        let cards = AdType::DISPLAY_ORDER
            .iter()
            .map(|ad_type| {
                let summary = summaries.remove(ad_type);
                CategoryCard {
                    ad_type: *ad_type,
                    name: ad_type.display_name(),
                    color: ad_type.color(),
                    metrics: summary.as_ref().map(CardMetrics::from_summary),
                    summary,
                }
            })
            .collect();

        let legend = AdType::DISPLAY_ORDER
            .iter()
            .map(|ad_type| LegendEntry {
                ad_type: *ad_type,
                name: ad_type.display_name(),
                color: ad_type.color(),
                data_key: ad_type.impressions_key(),
            })
            .collect();

        let month_labels = points.iter().map(|p| format_month(&p.month)).collect();
        let peak = points
            .iter()
            .flat_map(|p| p.ad_types().filter_map(move |t| p.impressions(t)))
            .max()
            .unwrap_or(0);

        Self {
            cards,
            chart: PerformanceChart {
                points,
                month_labels,
                legend,
                y_axis_max: format_magnitude(peak as f64),
            },
            record_count: records.len(),
        }
    }
}

/// Loads performance for a set of campaigns and renders the dashboard view.
pub struct MetricsDashboard {
    source: Arc<dyn PerformanceSource>,
}

impl MetricsDashboard {
    pub fn new(source: Arc<dyn PerformanceSource>) -> Self {
        Self { source }
    }

    /// Fetch once and build the view. No campaigns means an empty view
    /// without a fetch; a fetch failure is returned unchanged.
    pub fn load(&self, campaign_ids: &[CampaignId]) -> CampaignResult<DashboardView> {
        if campaign_ids.is_empty() {
            return Ok(DashboardView::from_records(&[]));
        }

        let records = self.source.fetch_performance(campaign_ids).map_err(|e| {
            error!(error = %e, campaigns = campaign_ids.len(), "Error loading performance data");
            e
        })?;
        metrics::counter!("dashboard.loads").increment(1);
        info!(
            campaigns = campaign_ids.len(),
            records = records.len(),
            "Performance data loaded"
        );

        Ok(DashboardView::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::source::InMemorySource;

    fn record(id: &str, campaign: &str, month: &str, ad_type: AdType, impressions: u64) -> PerformanceRecord {
        PerformanceRecord {
            id: id.to_string(),
            campaign_id: campaign.to_string(),
            month: Some(month.to_string()),
            ad_type,
            impressions: Some(impressions),
            clicks: Some(impressions / 10),
            conversions: Some(impressions / 100),
            conversion_rate: Some(2.5),
            spend: Some(10.0),
        }
    }

    #[test]
    fn test_cards_follow_display_order_and_mark_missing_channels() {
        let view = DashboardView::from_records(&[
            record("r1", "c1", "2024-01", AdType::DigitalOutOfHome, 2_300_000),
            record("r2", "c1", "2024-01", AdType::InApp, 1_500),
        ]);

        let order: Vec<_> = view.cards.iter().map(|c| c.ad_type).collect();
        assert_eq!(order, AdType::DISPLAY_ORDER.to_vec());

        let in_app = &view.cards[0];
        let metrics = in_app.metrics.as_ref().unwrap();
        assert_eq!(metrics.impressions, "1.5K");
        assert_eq!(metrics.clicks, "150");
        assert_eq!(metrics.conversion_rate, "2.5%");

        assert!(view.cards[1].metrics.is_none());
        assert_eq!(view.cards[3].metrics.as_ref().unwrap().impressions, "2.3M");
        assert_eq!(view.chart.y_axis_max, "2.3M");
    }

    #[test]
    fn test_chart_labels_and_legend() {
        let view = DashboardView::from_records(&[
            record("r1", "c1", "2024-02", AdType::InApp, 10),
            record("r2", "c1", "2024-01", AdType::ArVr, 20),
        ]);

        assert_eq!(view.chart.month_labels, vec!["Jan 2024", "Feb 2024"]);
        assert_eq!(view.chart.legend.len(), 4);
        assert_eq!(view.chart.legend[0].data_key, "in-app_impressions");
        assert_eq!(view.chart.legend[0].color, "#4F46E5");
    }

    #[test]
    fn test_malformed_record_renders_placeholder() {
        let mut broken = record("r1", "c1", "2024-01", AdType::WebContextual, 0);
        broken.clicks = None;
        let view = DashboardView::from_records(&[broken]);

        let metrics = view.cards[1].metrics.as_ref().unwrap();
        assert_eq!(metrics.clicks, "No data");
        assert_eq!(metrics.impressions, "0");
    }

    #[test]
    fn test_load_filters_to_requested_campaigns() {
        let source = InMemorySource::new().with_performance(vec![
            record("r1", "c1", "2024-01", AdType::InApp, 100),
            record("r2", "c2", "2024-01", AdType::InApp, 900),
        ]);
        let dashboard = MetricsDashboard::new(Arc::new(source));

        let view = dashboard.load(&["c1".to_string()]).unwrap();
        assert_eq!(view.record_count, 1);
        assert_eq!(view.cards[0].summary.as_ref().unwrap().impressions, Some(100));
    }

    #[test]
    fn test_load_without_campaigns_skips_fetch() {
        let dashboard = MetricsDashboard::new(Arc::new(InMemorySource::new().failing("unreachable")));
        let view = dashboard.load(&[]).unwrap();
        assert_eq!(view.record_count, 0);
        assert!(view.cards.iter().all(|c| c.metrics.is_none()));
        assert!(view.chart.points.is_empty());
    }

    #[test]
    fn test_load_surfaces_fetch_failure() {
        let dashboard = MetricsDashboard::new(Arc::new(InMemorySource::new().failing("401 unauthorized")));
        let err = dashboard.load(&["c1".to_string()]).unwrap_err();
        assert!(err.is_fetch_failure());
    }
}
