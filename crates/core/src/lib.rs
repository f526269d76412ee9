pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use source::{CampaignSource, InMemorySource, JsonFileSource, PerformanceSource, PreviewSource};
pub use types::{AdType, Campaign, CampaignId, CampaignStatus, PerformanceRecord, PreviewField, PreviewRecord};
