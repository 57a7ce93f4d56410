use crate::{clamp, MotionEnvironment};

const FOLLOW: f64 = 0.2;
const PRESS_EASE: f64 = 0.2;
const PRESSED_SCALE: f64 = 0.85;
const SLIDE_SCALE: f64 = 1.9;
const OFFSCREEN: f64 = -100.0;

/// Rendered state of the custom cursor for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorFrame {
    pub x: f64,
    pub y: f64,
    pub rotate: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub visible: bool,
}

impl CursorFrame {
    pub fn to_css(&self) -> String {
        format!(
            "translate3d({}px, {}px, 0) translate(-50%, -50%) rotate({}deg) scale({}, {})",
            self.x, self.y, self.rotate, self.scale_x, self.scale_y
        )
    }

    pub fn opacity(&self) -> f64 {
        if self.visible { 1.0 } else { 0.0 }
    }
}

/// Jelly-style pointer follower: smoothed position, squash and stretch from
/// velocity, press and hover scaling.
#[derive(Debug, Clone)]
pub struct CursorFollower {
    enabled: bool,
    target: (f64, f64),
    pos: (f64, f64),
    prev: (f64, f64),
    press: f64,
    press_target: f64,
    over_slide: bool,
    visible: bool,
}

impl CursorFollower {
    pub fn new(env: MotionEnvironment) -> Self {
        let start = (OFFSCREEN, OFFSCREEN);
        Self {
            enabled: env.allows_motion(),
            target: start,
            pos: start,
            prev: start,
            press: 1.0,
            press_target: 1.0,
            over_slide: false,
            visible: false,
        }
    }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.target = (x, y);
        self.visible = true;
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.press_target = if pressed { PRESSED_SCALE } else { 1.0 };
    }

    /// Whether the element under the pointer is a gallery slide.
    pub fn set_over_slide(&mut self, over: bool) {
        self.over_slide = over;
    }

    /// Step the physics by one frame.
    pub fn frame(&mut self) -> CursorFrame {
        if !self.enabled {
            return CursorFrame { x: self.pos.0, y: self.pos.1, rotate: 0.0, scale_x: 1.0, scale_y: 1.0, visible: false };
        }

        self.pos.0 += (self.target.0 - self.pos.0) * FOLLOW;
        self.pos.1 += (self.target.1 - self.pos.1) * FOLLOW;

        let vx = self.pos.0 - self.prev.0;
        let vy = self.pos.1 - self.prev.1;
        let speed = vx.hypot(vy);
        let angle = vy.atan2(vx).to_degrees();
        self.prev = self.pos;

        self.press += (self.press_target - self.press) * PRESS_EASE;

        let squash_x = 1.0 + clamp(speed * 0.03, 0.0, 0.35);
        let squash_y = 1.0 - clamp(speed * 0.02, 0.0, 0.22);
        let base = if self.over_slide { SLIDE_SCALE } else { 1.0 };

        CursorFrame {
            x: self.pos.0,
            y: self.pos.1,
            rotate: angle * 0.2,
            scale_x: squash_x * self.press * base,
            scale_y: squash_y * self.press * base,
            visible: self.visible,
        }
    }
}
