use std::time::Duration;

use tracing::debug;

use crate::MotionEnvironment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Manual interaction that takes control away from the auto-advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManualInput {
    /// Positive `delta_y` scrolls forward.
    Wheel { delta_y: f64 },
    Touch,
    Key { forward: bool },
    Pointer,
}

impl ManualInput {
    fn direction(&self) -> Option<Direction> {
        match *self {
            ManualInput::Wheel { delta_y } if delta_y > 0.0 => Some(Direction::Forward),
            ManualInput::Wheel { delta_y } if delta_y < 0.0 => Some(Direction::Backward),
            ManualInput::Key { forward: true } => Some(Direction::Forward),
            ManualInput::Key { forward: false } => Some(Direction::Backward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceState {
    Running,
    /// Waiting for `idle_delay` to pass since the last manual input.
    Paused { last_input: Duration },
    Hovered,
    Disabled,
}

/// Direction-aware yoyo auto-advance over carousel progress `[0, 1]`.
///
/// Times are offsets from an arbitrary origin (the page's animation clock).
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    progress: f64,
    direction: Direction,
    duration: Duration,
    idle_delay: Duration,
    state: AdvanceState,
    last_tick: Duration,
}

impl AutoAdvance {
    pub fn new(duration: Duration, idle_delay: Duration, env: MotionEnvironment) -> Self {
        let state = if env.reduced_motion { AdvanceState::Disabled } else { AdvanceState::Running };
        Self {
            progress: 0.0,
            direction: Direction::Forward,
            duration,
            idle_delay,
            state,
            last_tick: Duration::ZERO,
        }
    }

    pub fn progress(&self) -> f64 { self.progress }

    pub fn direction(&self) -> Direction { self.direction }

    pub fn state(&self) -> AdvanceState { self.state }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AdvanceState::Running)
    }

    /// Restart from 0% moving forward at `now`.
    pub fn start(&mut self, now: Duration) {
        if self.state == AdvanceState::Disabled {
            return;
        }
        self.progress = 0.0;
        self.direction = Direction::Forward;
        self.state = AdvanceState::Running;
        self.last_tick = now;
    }

    /// Adopt a position set by something else (scroll scrub, range input).
    pub fn sync_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn manual_input(&mut self, input: ManualInput, now: Duration) {
        if self.state == AdvanceState::Disabled {
            return;
        }
        if let Some(dir) = input.direction() {
            self.direction = dir;
        }
        if self.is_running() {
            debug!(?input, "auto-advance paused by manual input");
        }
        self.state = AdvanceState::Paused { last_input: now };
        self.last_tick = now;
    }

    pub fn set_hovered(&mut self, hovered: bool, now: Duration) {
        match (self.state, hovered) {
            (AdvanceState::Disabled, _) => {}
            (_, true) => self.state = AdvanceState::Hovered,
            (AdvanceState::Hovered, false) => {
                self.state = AdvanceState::Running;
                self.last_tick = now;
            }
            _ => {}
        }
    }

    /// Advance to `now` and return the progress to render.
    pub fn tick(&mut self, now: Duration) -> f64 {
        let moving_since = match self.state {
            AdvanceState::Running => Some(self.last_tick),
            AdvanceState::Paused { last_input } => {
                let resume_at = last_input + self.idle_delay;
                if now >= resume_at {
                    debug!("auto-advance resuming after idle delay");
                    self.state = AdvanceState::Running;
                    Some(resume_at.max(self.last_tick))
                } else {
                    None
                }
            }
            AdvanceState::Hovered | AdvanceState::Disabled => None,
        };

        if let Some(since) = moving_since {
            let elapsed = now.saturating_sub(since).as_secs_f64();
            let total = self.duration.as_secs_f64();
            if total > 0.0 && elapsed > 0.0 {
                self.step(elapsed / total * self.direction.sign());
            }
        }
        self.last_tick = self.last_tick.max(now);
        self.progress
    }

    fn step(&mut self, delta: f64) {
        let mut p = self.progress + delta % 2.0;
        loop {
            if p > 1.0 {
                p = 2.0 - p;
                self.direction = Direction::Backward;
            } else if p < 0.0 {
                p = -p;
                self.direction = Direction::Forward;
            } else {
                break;
            }
        }
        self.progress = p;
    }
}
