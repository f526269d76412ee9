use std::collections::BTreeMap;

use campaign_core::types::PreviewField;
use serde::Serialize;
use tracing::debug;

use crate::gesture::{classify_swipe, SwipeDirection, SWIPE_THRESHOLD};

/// Current slide per preview category.
///
/// Indices start at 0 and are clamped on every transition; out-of-range
/// requests are absorbed rather than rejected.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Carousel {
    indices: BTreeMap<PreviewField, usize>,
    swipe_threshold: f64,
}

impl Carousel {
    pub fn new() -> Self {
        Self::with_threshold(SWIPE_THRESHOLD)
    }

    pub fn with_threshold(swipe_threshold: f64) -> Self {
        Self {
            indices: BTreeMap::new(),
            swipe_threshold,
        }
    }

    pub fn swipe_threshold(&self) -> f64 {
        self.swipe_threshold
    }

    pub fn index(&self, category: PreviewField) -> usize {
        self.indices.get(&category).copied().unwrap_or(0)
    }

    pub fn previous(&mut self, category: PreviewField) -> usize {
        let index = self.index(category).saturating_sub(1);
        self.indices.insert(category, index);
        index
    }

    pub fn next(&mut self, category: PreviewField, max_index: usize) -> usize {
        let index = (self.index(category) + 1).min(max_index);
        self.indices.insert(category, index);
        index
    }

    /// Translate a completed drag into a transition.
    pub fn on_gesture(
        &mut self,
        category: PreviewField,
        start_x: f64,
        end_x: f64,
        max_index: usize,
    ) -> Option<SwipeDirection> {
        let direction = classify_swipe(start_x, end_x, self.swipe_threshold)?;
        match direction {
            SwipeDirection::Forward => self.next(category, max_index),
            SwipeDirection::Backward => self.previous(category),
        };
        debug!(%category, ?direction, index = self.index(category), "Carousel swipe");
        Some(direction)
    }

    /// Back to the first slide everywhere. Called on every fresh data load.
    pub fn reset(&mut self) {
        self.indices.clear();
    }

    /// Pull indices back inside `[0, len - 1]` after slide counts changed.
    /// Categories missing from `lengths` are treated as empty.
    pub fn clamp_to(&mut self, lengths: &BTreeMap<PreviewField, usize>) {
        for (category, index) in self.indices.iter_mut() {
            let len = lengths.get(category).copied().unwrap_or(0);
            *index = (*index).min(len.saturating_sub(1));
        }
    }
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB: PreviewField = PreviewField::WebsitePreview;
    const APP: PreviewField = PreviewField::MobileAppPreview;

    #[test]
    fn test_initial_index_is_zero() {
        let carousel = Carousel::new();
        assert_eq!(carousel.index(WEB), 0);
        assert_eq!(carousel.swipe_threshold(), 50.0);
    }

    #[test]
    fn test_previous_at_zero_is_noop() {
        let mut carousel = Carousel::new();
        assert_eq!(carousel.previous(WEB), 0);
        assert_eq!(carousel.index(WEB), 0);
    }

    #[test]
    fn test_next_stops_at_last_slide() {
        let mut carousel = Carousel::new();
        assert_eq!(carousel.next(WEB, 2), 1);
        assert_eq!(carousel.next(WEB, 2), 2);
        assert_eq!(carousel.next(WEB, 2), 2);
        assert_eq!(carousel.previous(WEB), 1);
    }

    #[test]
    fn test_index_stays_in_bounds_for_any_sequence() {
        let mut carousel = Carousel::new();
        let max_index = 3;
        let steps = [true, true, false, true, true, true, true, false, false, false, false, true];
        for forward in steps {
            if forward {
                carousel.next(WEB, max_index);
            } else {
                carousel.previous(WEB);
            }
            assert!(carousel.index(WEB) <= max_index);
        }
    }

    #[test]
    fn test_categories_are_independent() {
        let mut carousel = Carousel::new();
        carousel.next(WEB, 4);
        carousel.next(WEB, 4);
        assert_eq!(carousel.index(WEB), 2);
        assert_eq!(carousel.index(APP), 0);
    }

    #[test]
    fn test_gestures_drive_transitions() {
        let mut carousel = Carousel::new();
        assert_eq!(
            carousel.on_gesture(WEB, 200.0, 140.0, 3),
            Some(SwipeDirection::Forward)
        );
        assert_eq!(carousel.index(WEB), 1);

        assert_eq!(
            carousel.on_gesture(WEB, 140.0, 200.0, 3),
            Some(SwipeDirection::Backward)
        );
        assert_eq!(carousel.index(WEB), 0);

        assert_eq!(carousel.on_gesture(WEB, 100.0, 120.0, 3), None);
        assert_eq!(carousel.index(WEB), 0);
    }

    #[test]
    fn test_custom_threshold() {
        let mut carousel = Carousel::with_threshold(100.0);
        assert_eq!(carousel.on_gesture(WEB, 200.0, 140.0, 3), None);
        assert_eq!(
            carousel.on_gesture(WEB, 300.0, 140.0, 3),
            Some(SwipeDirection::Forward)
        );
    }

    #[test]
    fn test_reset_and_clamp() {
        let mut carousel = Carousel::new();
        for _ in 0..4 {
            carousel.next(WEB, 5);
            carousel.next(APP, 5);
        }

        let lengths = BTreeMap::from([(WEB, 2)]);
        carousel.clamp_to(&lengths);
        assert_eq!(carousel.index(WEB), 1);
        assert_eq!(carousel.index(APP), 0);

        carousel.next(WEB, 1);
        carousel.reset();
        assert_eq!(carousel.index(WEB), 0);
    }
}
