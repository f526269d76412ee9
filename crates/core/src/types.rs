use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Document identifier of a campaign in the external store.
pub type CampaignId = String;

/// Ad-delivery channel under which performance and campaigns are classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdType {
    #[serde(rename = "in-app")]
    InApp,
    #[serde(rename = "web-contextual")]
    WebContextual,
    #[serde(rename = "d-ooh")]
    DigitalOutOfHome,
    #[serde(rename = "ar-vr")]
    ArVr,
}

impl AdType {
    /// Order in which the dashboard lists category cards and chart lines.
    pub const DISPLAY_ORDER: [AdType; 4] = [
        AdType::InApp,
        AdType::WebContextual,
        AdType::ArVr,
        AdType::DigitalOutOfHome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::InApp => "in-app",
            AdType::WebContextual => "web-contextual",
            AdType::DigitalOutOfHome => "d-ooh",
            AdType::ArVr => "ar-vr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AdType::InApp => "In-App Advertising",
            AdType::WebContextual => "Web-Contextual Ads",
            AdType::DigitalOutOfHome => "D-OOH",
            AdType::ArVr => "Wearables & AR/VR",
        }
    }

    /// Chart line colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            AdType::InApp => "#4F46E5",
            AdType::WebContextual => "#9333EA",
            AdType::DigitalOutOfHome => "#F97316",
            AdType::ArVr => "#10B981",
        }
    }

    /// Field name carrying this channel's impressions on a monthly series point.
    pub fn impressions_key(&self) -> String {
        format!("{}_impressions", self.as_str())
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly performance fact for one campaign on one ad-delivery channel.
///
/// Written by an external ingestion process. Numeric fields and the month are
/// optional because documents in the store are not schema-enforced; a missing
/// value is carried through as "no data" rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceRecord {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    pub campaign_id: CampaignId,
    #[serde(default)]
    pub month: Option<String>,
    pub ad_type: AdType,
    #[serde(default, deserialize_with = "lenient_count")]
    pub impressions: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub clicks: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub conversions: Option<u64>,
    /// Percentage (0-100) stored per record, not derived from clicks.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub conversion_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub spend: Option<f64>,
}

/// Non-negative integer, or `None` for anything else the store holds
/// (strings, negatives, fractions, null).
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_u64()))
}

/// Finite number, or `None` for anything else.
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

/// Record field holding one kind of creative preview.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PreviewField {
    MobileAppPreview,
    WebsitePreview,
    DigitalOutdoorPreview,
    WearablesArVrPreview,
}

impl PreviewField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewField::MobileAppPreview => "mobile_app_preview",
            PreviewField::WebsitePreview => "website_preview",
            PreviewField::DigitalOutdoorPreview => "digital_outdoor_preview",
            PreviewField::WearablesArVrPreview => "wearables_ar_vr_preview",
        }
    }
}

impl fmt::Display for PreviewField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creative preview locators for a campaign, one optional URL per context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewRecord {
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    pub campaign_id: CampaignId,
    #[serde(default)]
    pub mobile_app_preview: Option<String>,
    #[serde(default)]
    pub website_preview: Option<String>,
    #[serde(default)]
    pub digital_outdoor_preview: Option<String>,
    #[serde(default)]
    pub wearables_ar_vr_preview: Option<String>,
}

impl PreviewRecord {
    /// Locator stored at `field`. Empty strings count as absent.
    pub fn locator(&self, field: PreviewField) -> Option<&str> {
        let value = match field {
            PreviewField::MobileAppPreview => &self.mobile_app_preview,
            PreviewField::WebsitePreview => &self.website_preview,
            PreviewField::DigitalOutdoorPreview => &self.digital_outdoor_preview,
            PreviewField::WearablesArVrPreview => &self.wearables_ar_vr_preview,
        };
        value.as_deref().filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
    Onboarded,
}

/// Campaign document as stored for a dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    #[serde(rename = "$id", alias = "id")]
    pub id: CampaignId,
    pub user_id: String,
    pub campaign_name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    pub status: CampaignStatus,
    pub ad_type: AdType,
    #[serde(default)]
    pub campaign_type: String,
    #[serde(default)]
    pub ad_platform: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target_kpi: String,
    #[serde(default)]
    pub target_event: String,
    #[serde(default)]
    pub targeting: String,
}
