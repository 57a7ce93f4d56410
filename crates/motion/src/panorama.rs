use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    Horizontal,
    Vertical,
}

/// Parameters of the curved "panorama" slide effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanoramaEffect {
    /// Push-back along Z in px.
    pub depth: f64,
    /// Total arc in degrees spanned by one slide step.
    pub rotate: f64,
}

impl Default for PanoramaEffect {
    fn default() -> Self {
        Self { depth: 200.0, rotate: 30.0 }
    }
}

/// Effect override applied from `min_width` px upwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: u32,
    pub effect: PanoramaEffect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTransform {
    pub translate: f64,
    pub translate_z: f64,
    pub angle: f64,
    pub direction: LayoutDirection,
}

impl SlideTransform {
    pub fn to_css(&self) -> String {
        match self.direction {
            LayoutDirection::Horizontal => format!(
                "translateX({}px) translateZ({}px) rotateY({}deg)",
                self.translate, self.translate_z, self.angle
            ),
            LayoutDirection::Vertical => format!(
                "translateY({}px) translateZ({}px) rotateX({}deg)",
                self.translate, self.translate_z, -self.angle
            ),
        }
    }
}

impl PanoramaEffect {
    /// Transform for one slide.
    ///
    /// `progress` is the slide's signed distance from the active position in
    /// slides, `size` its width (or height when vertical) in px.
    pub fn slide_transform(
        &self,
        progress: f64,
        size: f64,
        centered: bool,
        slides_per_view: f64,
        direction: LayoutDirection,
    ) -> SlideTransform {
        let half_arc = self.rotate * PI / 180.0 / 2.0;
        let step = self.rotate / 180.0;
        let offset = if centered { 0.0 } else { (slides_per_view - 1.0) * 0.5 };
        let l = progress + offset;
        let curve = 1.0 - (l * step * PI).cos();
        SlideTransform {
            translate: l * (size / 3.0) * curve,
            translate_z: (size * 0.5) / half_arc.sin() * curve - self.depth,
            angle: l * self.rotate,
            direction,
        }
    }

    /// Effect for a viewport width given a base effect and ascending breakpoints.
    pub fn for_width(base: PanoramaEffect, breakpoints: &[Breakpoint], width: u32) -> PanoramaEffect {
        breakpoints
            .iter()
            .filter(|b| b.min_width <= width)
            .max_by_key(|b| b.min_width)
            .map(|b| b.effect)
            .unwrap_or(base)
    }
}
