//! Campaign Dashboard: performance metrics and ad preview carousel.
//!
//! Reads exported store collections from a data directory and either serves
//! the dashboard API or prints a view as JSON.

use campaign_api::{ApiServer, AppState};
use campaign_core::config::AppConfig;
use campaign_core::source::{CampaignSource, JsonFileSource, PerformanceSource, PreviewSource};
use campaign_core::types::CampaignId;
use campaign_preview::PreviewSection;
use campaign_reporting::{DashboardView, MetricsDashboard};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "campaign-dashboard")]
#[command(about = "Campaign performance dashboard and ad preview carousel")]
#[command(version)]
struct Cli {
    /// Directory with campaigns.json, campaign_performance.json and previews.json (overrides config)
    #[arg(long, env = "CAMPAIGN_DASHBOARD__DATA__DIR")]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard API over HTTP
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "CAMPAIGN_DASHBOARD__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Do not start the Prometheus exporter
        #[arg(long, default_value_t = false)]
        no_metrics: bool,
    },
    /// Print the performance dashboard for a user's campaigns
    Metrics {
        #[arg(long)]
        user_id: String,

        /// Restrict to these campaigns (comma-separated)
        #[arg(long, value_delimiter = ',')]
        campaign_ids: Vec<String>,
    },
    /// Print the preview carousel for a user's campaigns
    Previews {
        #[arg(long)]
        user_id: String,

        /// Only show previews of this campaign
        #[arg(long)]
        campaign_id: Option<String>,
    },
    /// Print metrics and previews together, fetched concurrently
    Overview {
        #[arg(long)]
        user_id: String,
    },
}

#[derive(Debug, Serialize)]
struct Overview {
    metrics: DashboardView,
    previews: Vec<campaign_preview::CategorySlide>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_dashboard=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }

    info!(
        data_dir = %config.data.dir,
        swipe_threshold = config.carousel.swipe_threshold,
        "Configuration loaded"
    );

    let source = Arc::new(JsonFileSource::new(&config.data.dir));
    if !source.dir().is_dir() {
        tracing::warn!(dir = %source.dir().display(), "Data directory does not exist");
    }

    match cli.command {
        Command::Serve {
            http_port,
            no_metrics,
        } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }
            let state = AppState {
                performance: source.clone(),
                campaigns: source.clone(),
                previews: source,
                swipe_threshold: config.carousel.swipe_threshold,
                start_time: Instant::now(),
            };
            let api_server = ApiServer::new(config.clone(), state);

            if config.metrics.enabled && !no_metrics {
                if let Err(e) = api_server.start_metrics() {
                    error!(error = %e, "Failed to start metrics exporter");
                }
            }

            info!("Campaign Dashboard is ready to serve traffic");
            api_server.start_http().await?;
        }
        Command::Metrics {
            user_id,
            campaign_ids,
        } => {
            let ids = if campaign_ids.is_empty() {
                user_campaign_ids(source.as_ref(), &user_id)?
            } else {
                campaign_ids
            };
            let view = MetricsDashboard::new(source).load(&ids)?;
            print_json(&view)?;
        }
        Command::Previews {
            user_id,
            campaign_id,
        } => {
            let mut section = PreviewSection::new(config.carousel.swipe_threshold);
            section.load(
                source.as_ref(),
                source.as_ref(),
                &user_id,
                campaign_id.as_deref(),
            )?;
            print_json(&section.slides())?;
        }
        Command::Overview { user_id } => {
            let overview = overview(source, &user_id, config.carousel.swipe_threshold).await?;
            print_json(&overview)?;
        }
    }

    Ok(())
}

fn user_campaign_ids(source: &dyn CampaignSource, user_id: &str) -> anyhow::Result<Vec<CampaignId>> {
    Ok(source
        .fetch_campaigns(user_id)?
        .into_iter()
        .map(|c| c.id)
        .collect())
}

/// Fetch performance and previews in parallel, then build both views.
/// Either fetch failing aborts the whole load.
async fn overview(
    source: Arc<JsonFileSource>,
    user_id: &str,
    swipe_threshold: f64,
) -> anyhow::Result<Overview> {
    let campaigns = source.fetch_campaigns(user_id)?;
    let ids: Vec<CampaignId> = campaigns.iter().map(|c| c.id.clone()).collect();

    let performance = {
        let source = source.clone();
        let ids = ids.clone();
        tokio::task::spawn_blocking(move || source.fetch_performance(&ids))
    };
    let previews = {
        let source = source.clone();
        let ids = ids.clone();
        tokio::task::spawn_blocking(move || source.fetch_previews(&ids))
    };
    let (performance, previews) = tokio::try_join!(performance, previews)?;
    let (records, previews) = (performance?, previews?);

    let mut section = PreviewSection::new(swipe_threshold);
    section.apply(campaigns, previews);

    Ok(Overview {
        metrics: DashboardView::from_records(&records),
        previews: section.slides(),
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::error::CampaignError;
    use campaign_core::source::{CAMPAIGNS_FILE, PERFORMANCE_FILE, PREVIEWS_FILE};
    use std::path::Path;

    fn write(dir: &Path, file: &str, value: serde_json::Value) {
        std::fs::write(dir.join(file), serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn seed_campaigns_and_performance(dir: &Path) {
        write(
            dir,
            CAMPAIGNS_FILE,
            serde_json::json!([
                {"$id": "c1", "user_id": "u1", "campaign_name": "Spring Launch", "status": "active", "ad_type": "in-app"}
            ]),
        );
        write(
            dir,
            PERFORMANCE_FILE,
            serde_json::json!([
                {"$id": "r1", "campaign_id": "c1", "month": "2024-01", "ad_type": "in-app",
                 "impressions": 1500, "clicks": 30, "conversions": 3, "conversion_rate": 2.0}
            ]),
        );
    }

    #[tokio::test]
    async fn test_overview_builds_both_views() {
        let dir = tempfile::tempdir().unwrap();
        seed_campaigns_and_performance(dir.path());
        write(
            dir.path(),
            PREVIEWS_FILE,
            serde_json::json!([
                {"$id": "p1", "campaign_id": "c1", "website_preview": "https://cdn.example.com/w.png"}
            ]),
        );

        let source = Arc::new(JsonFileSource::new(dir.path()));
        let overview = overview(source, "u1", 50.0).await.unwrap();

        assert_eq!(overview.metrics.record_count, 1);
        assert_eq!(overview.previews.len(), 4);
        assert_eq!(overview.previews[0].counter.as_deref(), Some("1 / 1"));
        assert_eq!(overview.previews[0].source_campaign.as_deref(), Some("Spring Launch"));
    }

    #[tokio::test]
    async fn test_overview_fails_when_one_export_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        seed_campaigns_and_performance(dir.path());

        let source = Arc::new(JsonFileSource::new(dir.path()));
        let err = overview(source, "u1", 50.0).await.unwrap_err();

        let cause = err.downcast_ref::<CampaignError>().unwrap();
        assert!(cause.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_overview_fails_when_performance_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            CAMPAIGNS_FILE,
            serde_json::json!([
                {"$id": "c1", "user_id": "u1", "campaign_name": "Spring Launch", "status": "active", "ad_type": "in-app"}
            ]),
        );
        write(dir.path(), PREVIEWS_FILE, serde_json::json!([]));

        let source = Arc::new(JsonFileSource::new(dir.path()));
        assert!(overview(source, "u1", 50.0).await.is_err());
    }
}
