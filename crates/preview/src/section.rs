//! Preview section: loads previews for a user's campaigns and drives one
//! carousel per preview category.

use std::collections::BTreeMap;

use campaign_core::error::CampaignResult;
use campaign_core::source::{CampaignSource, PreviewSource};
use campaign_core::types::{Campaign, CampaignId, PreviewField, PreviewRecord};
use serde::Serialize;
use tracing::{error, info};

use crate::carousel::Carousel;
use crate::catalogue::{collect_urls, order_categories, PreviewCategory, PREVIEW_CATEGORIES};
use crate::gesture::{SwipeDirection, TouchTracker};

pub const UNKNOWN_CAMPAIGN: &str = "Unknown Campaign";

/// Render state of one category's carousel.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategorySlide {
    pub category: PreviewCategory,
    pub urls: Vec<String>,
    pub current_index: usize,
    pub current_url: Option<String>,
    /// `"2 / 5"` style position indicator.
    pub counter: Option<String>,
    /// Previous/next controls are only shown with more than one slide.
    pub show_controls: bool,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    /// Name of the campaign the current slide belongs to.
    pub source_campaign: Option<String>,
    pub placeholder: Option<String>,
}

/// Campaigns whose previews are shown: the selected one, or all of the user's.
pub fn resolve_campaign_ids(campaigns: &[Campaign], selected: Option<&str>) -> Vec<CampaignId> {
    match selected {
        Some(id) => vec![id.to_string()],
        None => campaigns.iter().map(|c| c.id.clone()).collect(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewSection {
    campaigns: Vec<Campaign>,
    previews: Vec<PreviewRecord>,
    categories: Vec<PreviewCategory>,
    carousel: Carousel,
    touch: TouchTracker,
    loaded: bool,
}

impl PreviewSection {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            carousel: Carousel::with_threshold(swipe_threshold),
            ..Default::default()
        }
    }

    /// Fetch the user's campaigns and their previews, then start a fresh
    /// carousel session. On failure the section is left unloaded.
    pub fn load(
        &mut self,
        campaign_source: &dyn CampaignSource,
        preview_source: &dyn PreviewSource,
        user_id: &str,
        selected_campaign: Option<&str>,
    ) -> CampaignResult<()> {
        let fetched = campaign_source.fetch_campaigns(user_id).and_then(|campaigns| {
            let ids = resolve_campaign_ids(&campaigns, selected_campaign);
            let previews = if ids.is_empty() {
                Vec::new()
            } else {
                preview_source.fetch_previews(&ids)?
            };
            Ok((campaigns, previews))
        });

        match fetched {
            Ok((campaigns, previews)) => {
                self.apply(campaigns, previews);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, user_id, "Error loading preview data");
                self.clear();
                Err(e)
            }
        }
    }

    /// Install freshly fetched data: every carousel restarts at slide 0 and
    /// categories are reordered by availability.
    pub fn apply(&mut self, campaigns: Vec<Campaign>, previews: Vec<PreviewRecord>) {
        self.categories = order_categories(&PREVIEW_CATEGORIES, &previews);
        self.campaigns = campaigns;
        self.previews = previews;
        self.carousel.reset();
        self.touch = TouchTracker::default();
        self.loaded = true;
        metrics::counter!("previews.loads").increment(1);
        info!(
            campaigns = self.campaigns.len(),
            previews = self.previews.len(),
            "Preview data loaded"
        );
    }

    /// Swap in an updated preview list while keeping each carousel's position,
    /// clamped to the new slide counts. Category order is kept.
    pub fn refresh_previews(&mut self, previews: Vec<PreviewRecord>) {
        self.previews = previews;
        let lengths: BTreeMap<PreviewField, usize> = PREVIEW_CATEGORIES
            .iter()
            .map(|c| (c.key, collect_urls(c, &self.previews).len()))
            .collect();
        self.carousel.clamp_to(&lengths);
    }

    fn clear(&mut self) {
        self.campaigns.clear();
        self.previews.clear();
        self.categories.clear();
        self.carousel.reset();
        self.touch = TouchTracker::default();
        self.loaded = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Loaded, but nothing to show ("No previews available").
    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }

    pub fn categories(&self) -> &[PreviewCategory] {
        &self.categories
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    fn category(&self, key: PreviewField) -> PreviewCategory {
        PREVIEW_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.key == key)
            .unwrap_or(PREVIEW_CATEGORIES[0])
    }

    pub fn urls(&self, key: PreviewField) -> Vec<String> {
        collect_urls(&self.category(key), &self.previews)
    }

    fn max_index(&self, key: PreviewField) -> usize {
        self.urls(key).len().saturating_sub(1)
    }

    pub fn previous(&mut self, key: PreviewField) -> usize {
        self.carousel.previous(key)
    }

    pub fn next(&mut self, key: PreviewField) -> usize {
        let max_index = self.max_index(key);
        self.carousel.next(key, max_index)
    }

    pub fn touch_start(&mut self, x: f64) {
        self.touch.start(x);
    }

    pub fn touch_move(&mut self, x: f64) {
        self.touch.move_to(x);
    }

    /// Horizontal offset to apply to the slide while a drag is in progress.
    pub fn drag_offset(&self) -> Option<f64> {
        self.touch.offset()
    }

    /// Complete the touch on `key`'s carousel. Taps without movement are ignored.
    pub fn touch_end(&mut self, key: PreviewField) -> Option<SwipeDirection> {
        let (start_x, end_x) = self.touch.finish()?;
        let max_index = self.max_index(key);
        self.carousel.on_gesture(key, start_x, end_x, max_index)
    }

    fn campaign_name_for(&self, key: PreviewField, url: &str) -> String {
        self.previews
            .iter()
            .find(|p| p.locator(key) == Some(url))
            .and_then(|p| self.campaigns.iter().find(|c| c.id == p.campaign_id))
            .map(|c| c.campaign_name.clone())
            .unwrap_or_else(|| UNKNOWN_CAMPAIGN.to_string())
    }

    pub fn slide(&self, key: PreviewField) -> CategorySlide {
        let category = self.category(key);
        let urls = collect_urls(&category, &self.previews);

        if urls.is_empty() {
            return CategorySlide {
                placeholder: Some(format!(
                    "No preview available for {}",
                    category.title.to_lowercase()
                )),
                category,
                urls,
                current_index: 0,
                current_url: None,
                counter: None,
                show_controls: false,
                can_go_previous: false,
                can_go_next: false,
                source_campaign: None,
            };
        }

        let last = urls.len() - 1;
        let current_index = self.carousel.index(key).min(last);
        let current_url = urls[current_index].clone();

        CategorySlide {
            counter: Some(format!("{} / {}", current_index + 1, urls.len())),
            show_controls: urls.len() > 1,
            can_go_previous: current_index > 0,
            can_go_next: current_index < last,
            source_campaign: Some(self.campaign_name_for(key, &current_url)),
            current_url: Some(current_url),
            current_index,
            placeholder: None,
            category,
            urls,
        }
    }

    /// Slides for every category, in display order.
    pub fn slides(&self) -> Vec<CategorySlide> {
        self.categories.iter().map(|c| self.slide(c.key)).collect()
    }
}
