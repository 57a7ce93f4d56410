use crate::clamp;

const MIN_PIN_DISTANCE: f64 = 1200.0;
const PIN_FACTOR: f64 = 1.25;
const FALLBACK_RANGE: f64 = 1000.0;

/// Maps normalized page-scroll progress onto the carousel's translate range.
///
/// `min_translate` and `max_translate` are the slider's own bounds; for a
/// left-to-right strip `max` is usually the more negative one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollScrub {
    pub min_translate: f64,
    pub max_translate: f64,
}

impl ScrollScrub {
    pub fn new(min_translate: f64, max_translate: f64) -> Self {
        Self { min_translate, max_translate }
    }

    /// Translate target for progress in `[0, 1]` (clamped).
    pub fn translate_for(&self, progress: f64) -> f64 {
        let p = if progress.is_nan() { 0.0 } else { clamp(progress, 0.0, 1.0) };
        self.min_translate + p * (self.max_translate - self.min_translate)
    }

    /// Inverse of [`translate_for`](Self::translate_for) as a whole percent.
    pub fn percent_for(&self, translate: f64, rtl: bool) -> u8 {
        let logical = if rtl { -translate } else { translate };
        let mut denom = self.max_translate - self.min_translate;
        if denom == 0.0 {
            denom = 1.0;
        }
        let p = (logical - self.min_translate) / denom;
        (clamp(p, 0.0, 1.0) * 100.0).round() as u8
    }

    /// Scroll distance (px) the section stays pinned while scrubbing, long
    /// enough to reach every slide.
    pub fn pin_distance(&self) -> f64 {
        let mut range = (self.max_translate - self.min_translate).abs();
        if range == 0.0 {
            range = FALLBACK_RANGE;
        }
        MIN_PIN_DISTANCE.max((range * PIN_FACTOR).round())
    }

    /// Normalized progress through the pinned section for a page scroll offset.
    pub fn progress_for_scroll(&self, scroll_y: f64, pin_start: f64) -> f64 {
        clamp((scroll_y - pin_start) / self.pin_distance(), 0.0, 1.0)
    }

    /// Convenience: page scroll offset straight to a translate target.
    pub fn translate_for_scroll(&self, scroll_y: f64, pin_start: f64) -> f64 {
        self.translate_for(self.progress_for_scroll(scroll_y, pin_start))
    }
}
