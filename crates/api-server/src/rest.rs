//! REST API handlers for the dashboard views and operational endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaign_core::error::CampaignError;
use campaign_core::source::{CampaignSource, PerformanceSource, PreviewSource};
use campaign_preview::{CategorySlide, PreviewSection};
use campaign_reporting::{DashboardView, MetricsDashboard};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Maximum number of campaign ids accepted in one metrics request.
const MAX_CAMPAIGN_IDS: usize = 100;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub performance: Arc<dyn PerformanceSource>,
    pub campaigns: Arc<dyn CampaignSource>,
    pub previews: Arc<dyn PreviewSource>,
    pub swipe_threshold: f64,
    pub start_time: Instant,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    metrics::counter!("api.validation_errors").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_request".to_string(),
            message: message.to_string(),
        }),
    )
}

fn load_failed(e: CampaignError) -> ApiError {
    metrics::counter!("api.errors").increment(1);
    if e.is_fetch_failure() {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "fetch_failed".to_string(),
                message: e.to_string(),
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "internal_error".to_string(),
                message: "Internal processing error".to_string(),
            }),
        )
    }
}

fn task_failed(e: tokio::task::JoinError) -> ApiError {
    error!(error = %e, "Blocking load task failed");
    load_failed(CampaignError::Internal(e.into()))
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// Comma-separated campaign ids.
    pub campaign_ids: Option<String>,
}

fn parse_campaign_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /v1/metrics: per-channel cards and the monthly impressions chart.
pub async fn dashboard_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let Some(raw) = query.campaign_ids else {
        return Err(bad_request("query parameter 'campaign_ids' is required"));
    };
    let campaign_ids = parse_campaign_ids(&raw);
    if campaign_ids.len() > MAX_CAMPAIGN_IDS {
        warn!(count = campaign_ids.len(), "Too many campaign ids requested");
        return Err(bad_request("too many campaign ids"));
    }

    let dashboard = MetricsDashboard::new(state.performance.clone());
    let view = tokio::task::spawn_blocking(move || dashboard.load(&campaign_ids))
        .await
        .map_err(task_failed)?
        .map_err(load_failed)?;

    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct PreviewsQuery {
    pub user_id: Option<String>,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewsResponse {
    /// True when no previews exist for the resolved campaigns.
    pub empty: bool,
    pub categories: Vec<CategorySlide>,
}

/// GET /v1/previews: preview categories ordered by availability.
pub async fn previews(
    State(state): State<AppState>,
    Query(query): Query<PreviewsQuery>,
) -> Result<Json<PreviewsResponse>, ApiError> {
    let Some(user_id) = query.user_id.filter(|u| !u.is_empty()) else {
        return Err(bad_request("query parameter 'user_id' is required"));
    };

    let response = tokio::task::spawn_blocking(move || {
        let mut section = PreviewSection::new(state.swipe_threshold);
        section.load(
            state.campaigns.as_ref(),
            state.previews.as_ref(),
            &user_id,
            query.campaign_id.as_deref(),
        )?;
        Ok::<_, CampaignError>(PreviewsResponse {
            empty: section.is_empty(),
            categories: section.slides(),
        })
    })
    .await
    .map_err(task_failed)?
    .map_err(load_failed)?;

    Ok(Json(response))
}

/// GET /health: health check.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /live: liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
