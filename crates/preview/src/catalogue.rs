//! Fixed preview categories and the availability-first ordering applied to them.

use campaign_core::types::{PreviewField, PreviewRecord};
use serde::Serialize;

/// A display context for campaign creative previews.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PreviewCategory {
    pub title: &'static str,
    pub key: PreviewField,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const PREVIEW_CATEGORIES: [PreviewCategory; 4] = [
    PreviewCategory {
        title: "Mobile App",
        key: PreviewField::MobileAppPreview,
        description: "Preview how your ad will appear in mobile applications",
        icon: "📱",
    },
    PreviewCategory {
        title: "Website",
        key: PreviewField::WebsitePreview,
        description: "See how your ad looks on websites",
        icon: "🌐",
    },
    PreviewCategory {
        title: "Digital Outdoor",
        key: PreviewField::DigitalOutdoorPreview,
        description: "View your ad on digital outdoor displays",
        icon: "🏙️",
    },
    PreviewCategory {
        title: "Wearables & AR/VR",
        key: PreviewField::WearablesArVrPreview,
        description: "Experience your ad in augmented and virtual reality",
        icon: "🥽",
    },
];

/// True if any preview carries a locator for `category`.
pub fn has_data(category: &PreviewCategory, previews: &[PreviewRecord]) -> bool {
    previews.iter().any(|p| p.locator(category.key).is_some())
}

/// Categories with previews first, then the rest; relative order within each
/// group is the input order.
pub fn order_categories(
    categories: &[PreviewCategory],
    previews: &[PreviewRecord],
) -> Vec<PreviewCategory> {
    let (mut with_data, without_data): (Vec<_>, Vec<_>) = categories
        .iter()
        .copied()
        .partition(|category| has_data(category, previews));
    with_data.extend(without_data);
    with_data
}

/// Locators for `category`, in fetch order.
pub fn collect_urls(category: &PreviewCategory, previews: &[PreviewRecord]) -> Vec<String> {
    previews
        .iter()
        .filter_map(|p| p.locator(category.key))
        .map(str::to_string)
        .collect()
}
