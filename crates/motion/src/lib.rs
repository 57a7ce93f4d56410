//! Carousel interaction math for the gallery page.
//!
//! Everything here is deterministic: callers feed in elapsed time, pointer
//! positions and layout measurements, and get back target offsets or CSS
//! transform strings. The browser side only wires these to its animation
//! frame loop.

pub mod auto_advance;
pub mod cursor;
pub mod panorama;
pub mod scroll;
pub mod settings;

pub use auto_advance::{AutoAdvance, Direction, ManualInput};
pub use cursor::{CursorFollower, CursorFrame};
pub use panorama::{Breakpoint, LayoutDirection, PanoramaEffect, SlideTransform};
pub use scroll::ScrollScrub;
pub use settings::CarouselSettings;

/// What the client detected about the device before starting any animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionEnvironment {
    pub reduced_motion: bool,
    pub coarse_pointer: bool,
}

impl MotionEnvironment {
    /// Animated extras are skipped entirely on reduced-motion or touch devices.
    pub fn allows_motion(&self) -> bool {
        !self.reduced_motion && !self.coarse_pointer
    }
}

pub(crate) fn clamp(v: f64, min: f64, max: f64) -> f64 {
    v.max(min).min(max)
}
