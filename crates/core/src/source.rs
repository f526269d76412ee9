//! Read-only data-access capabilities over the external document store.
//!
//! The dashboard core never talks to the store directly; loaders accept any
//! implementation of these traits. Failures are reported as
//! [`CampaignError::Fetch`] and are never retried here.

use crate::error::{CampaignError, CampaignResult};
use crate::types::{Campaign, CampaignId, PerformanceRecord, PreviewRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CAMPAIGNS_FILE: &str = "campaigns.json";
pub const PERFORMANCE_FILE: &str = "campaign_performance.json";
pub const PREVIEWS_FILE: &str = "previews.json";

/// Fetches performance records belonging to any of the given campaigns.
pub trait PerformanceSource: Send + Sync {
    fn fetch_performance(&self, campaign_ids: &[CampaignId])
        -> CampaignResult<Vec<PerformanceRecord>>;
}

/// Fetches preview records belonging to any of the given campaigns.
pub trait PreviewSource: Send + Sync {
    fn fetch_previews(&self, campaign_ids: &[CampaignId]) -> CampaignResult<Vec<PreviewRecord>>;
}

/// Fetches the campaigns owned by a dashboard user.
pub trait CampaignSource: Send + Sync {
    fn fetch_campaigns(&self, user_id: &str) -> CampaignResult<Vec<Campaign>>;
}

// ─── In-memory source ───────────────────────────────────────────────────────

/// Source backed by vectors held in memory. Returns records in insertion
/// order. Can be switched into a failing mode to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    campaigns: Vec<Campaign>,
    performance: Vec<PerformanceRecord>,
    previews: Vec<PreviewRecord>,
    failure: Option<String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_campaigns(mut self, campaigns: Vec<Campaign>) -> Self {
        self.campaigns = campaigns;
        self
    }

    pub fn with_performance(mut self, records: Vec<PerformanceRecord>) -> Self {
        self.performance = records;
        self
    }

    pub fn with_previews(mut self, previews: Vec<PreviewRecord>) -> Self {
        self.previews = previews;
        self
    }

    /// Every subsequent fetch fails with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn check(&self) -> CampaignResult<()> {
        match &self.failure {
            Some(message) => Err(CampaignError::fetch(message.clone())),
            None => Ok(()),
        }
    }
}

impl PerformanceSource for InMemorySource {
    fn fetch_performance(
        &self,
        campaign_ids: &[CampaignId],
    ) -> CampaignResult<Vec<PerformanceRecord>> {
        self.check()?;
        Ok(self
            .performance
            .iter()
            .filter(|r| campaign_ids.contains(&r.campaign_id))
            .cloned()
            .collect())
    }
}

impl PreviewSource for InMemorySource {
    fn fetch_previews(&self, campaign_ids: &[CampaignId]) -> CampaignResult<Vec<PreviewRecord>> {
        self.check()?;
        Ok(self
            .previews
            .iter()
            .filter(|p| campaign_ids.contains(&p.campaign_id))
            .cloned()
            .collect())
    }
}

impl CampaignSource for InMemorySource {
    fn fetch_campaigns(&self, user_id: &str) -> CampaignResult<Vec<Campaign>> {
        self.check()?;
        Ok(self
            .campaigns
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ─── JSON export source ─────────────────────────────────────────────────────

/// A collection export is either a bare array of documents or a store
/// list response (`{"total": n, "documents": [...]}`).
#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionExport {
    Array(Vec<serde_json::Value>),
    Documents { documents: Vec<serde_json::Value> },
}

impl CollectionExport {
    fn into_documents(self) -> Vec<serde_json::Value> {
        match self {
            CollectionExport::Array(documents) => documents,
            CollectionExport::Documents { documents } => documents,
        }
    }
}

/// Source reading exported store collections from a directory.
///
/// Files are re-read on every fetch; documents are returned in file order,
/// which is the deterministic order callers rely on for tie-breaks.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_collection<T: DeserializeOwned>(&self, file: &str) -> CampaignResult<Vec<T>> {
        let path = self.dir.join(file);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            metrics::counter!("source.fetch_errors").increment(1);
            warn!(path = %path.display(), error = %e, "Failed to read collection export");
            CampaignError::fetch(format!("{}: {e}", path.display()))
        })?;
        let export: CollectionExport = serde_json::from_str(&raw).map_err(|e| {
            metrics::counter!("source.fetch_errors").increment(1);
            warn!(path = %path.display(), error = %e, "Failed to parse collection export");
            CampaignError::fetch(format!("{}: {e}", path.display()))
        })?;

        // One undecodable document is dropped; the rest of the batch loads.
        let documents: Vec<T> = export
            .into_documents()
            .into_iter()
            .enumerate()
            .filter_map(|(position, document)| match serde_json::from_value(document) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    metrics::counter!("source.fetch_errors").increment(1);
                    warn!(path = %path.display(), position, error = %e, "Skipping undecodable document");
                    None
                }
            })
            .collect();
        debug!(path = %path.display(), count = documents.len(), "Read collection export");
        Ok(documents)
    }
}

impl PerformanceSource for JsonFileSource {
    fn fetch_performance(
        &self,
        campaign_ids: &[CampaignId],
    ) -> CampaignResult<Vec<PerformanceRecord>> {
        let records: Vec<PerformanceRecord> = self.read_collection(PERFORMANCE_FILE)?;
        Ok(records
            .into_iter()
            .filter(|r| campaign_ids.contains(&r.campaign_id))
            .collect())
    }
}

impl PreviewSource for JsonFileSource {
    fn fetch_previews(&self, campaign_ids: &[CampaignId]) -> CampaignResult<Vec<PreviewRecord>> {
        let previews: Vec<PreviewRecord> = self.read_collection(PREVIEWS_FILE)?;
        Ok(previews
            .into_iter()
            .filter(|p| campaign_ids.contains(&p.campaign_id))
            .collect())
    }
}

impl CampaignSource for JsonFileSource {
    fn fetch_campaigns(&self, user_id: &str) -> CampaignResult<Vec<Campaign>> {
        let campaigns: Vec<Campaign> = self.read_collection(CAMPAIGNS_FILE)?;
        Ok(campaigns
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect())
    }
}
