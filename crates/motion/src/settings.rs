use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::panorama::{Breakpoint, LayoutDirection, PanoramaEffect};

/// Client-side carousel configuration, served as JSON to the gallery page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselSettings {
    pub auto_progress_ms: u64,
    pub idle_resume_ms: u64,
    pub space_between: u32,
    pub centered: bool,
    pub direction: LayoutDirection,
    pub effect: PanoramaEffect,
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        let bp = |min_width, rotate, depth| Breakpoint { min_width, effect: PanoramaEffect { depth, rotate } };
        Self {
            auto_progress_ms: 10_000,
            idle_resume_ms: 3_000,
            space_between: 8,
            centered: true,
            direction: LayoutDirection::Horizontal,
            effect: PanoramaEffect { depth: 150.0, rotate: 45.0 },
            breakpoints: vec![
                bp(480, 35.0, 150.0),
                bp(640, 30.0, 150.0),
                bp(1024, 30.0, 200.0),
                bp(1200, 25.0, 250.0),
            ],
        }
    }
}

impl CarouselSettings {
    pub fn with_timing(mut self, auto_progress: Duration, idle_resume: Duration) -> Self {
        self.auto_progress_ms = auto_progress.as_millis() as u64;
        self.idle_resume_ms = idle_resume.as_millis() as u64;
        self
    }

    pub fn effect_for_width(&self, width: u32) -> PanoramaEffect {
        PanoramaEffect::for_width(self.effect, &self.breakpoints, width)
    }
}
