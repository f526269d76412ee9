//! Touch-swipe interpretation, independent of any input-event mechanism.

use serde::Serialize;

pub use campaign_core::config::SWIPE_THRESHOLD;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    /// Finger moved left: advance to the next slide.
    Forward,
    /// Finger moved right: go back one slide.
    Backward,
}

/// Classify a horizontal drag from `start_x` to `end_x`.
///
/// Travel must strictly exceed `threshold`; shorter drags are taps.
pub fn classify_swipe(start_x: f64, end_x: f64, threshold: f64) -> Option<SwipeDirection> {
    let distance = start_x - end_x;
    if distance > threshold {
        Some(SwipeDirection::Forward)
    } else if distance < -threshold {
        Some(SwipeDirection::Backward)
    } else {
        None
    }
}

/// Coordinates of the touch in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchTracker {
    start: Option<f64>,
    end: Option<f64>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, x: f64) {
        self.end = None;
        self.start = Some(x);
    }

    pub fn move_to(&mut self, x: f64) {
        self.end = Some(x);
    }

    /// Current drag offset while both ends are known.
    pub fn offset(&self) -> Option<f64> {
        Some(self.end? - self.start?)
    }

    /// Finish the touch. Yields the coordinates only if the finger moved,
    /// and clears the tracker either way.
    pub fn finish(&mut self) -> Option<(f64, f64)> {
        let coords = self.start.zip(self.end);
        *self = Self::default();
        coords
    }
}
