//! Creative preview carousel: orders preview categories by availability and
//! tracks the current slide of each category, including touch swipes.

pub mod carousel;
pub mod catalogue;
pub mod gesture;
pub mod section;

pub use carousel::Carousel;
pub use catalogue::{collect_urls, order_categories, PreviewCategory, PREVIEW_CATEGORIES};
pub use gesture::{classify_swipe, SwipeDirection, SWIPE_THRESHOLD};
pub use section::{CategorySlide, PreviewSection};
