//! Campaign performance reporting: per-channel aggregation, the monthly
//! impressions series, and the display formatting used by the dashboard.

pub mod aggregator;
pub mod dashboard;
pub mod format;

pub use aggregator::{aggregate_by_category, build_monthly_series, CategorySummary, MonthlySeriesPoint};
pub use dashboard::{DashboardView, MetricsDashboard};
pub use format::{format_magnitude, NO_DATA};
