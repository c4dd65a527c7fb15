//! Cosmetic animation state: impact wobble and intro pop-in.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use bulwark_core::constants::WOBBLE_FREQUENCY;

/// Decaying sine wobble triggered by impacts. Never affects gameplay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub magnitude: f64,
    pub phase: f64,
}

impl Wobble {
    /// Apply an impact of `strength`.
    ///
    /// With `add` the strength stacks on the current magnitude; otherwise the
    /// magnitude is raised to at least `strength`. `reset` restarts the sine.
    pub fn kick(&mut self, strength: f64, add: bool, reset: bool) {
        if add {
            self.magnitude += strength;
        } else {
            self.magnitude = self.magnitude.max(strength);
        }
        if reset {
            self.phase = 0.0;
        }
    }

    pub fn update(&mut self, dt: f64) {
        self.magnitude = (self.magnitude - dt).max(0.0);
        self.phase = (self.phase + dt * WOBBLE_FREQUENCY) % PI;
    }

    /// Current displacement factor for the draw layer.
    pub fn offset(&self) -> f64 {
        self.magnitude * self.phase.sin()
    }
}

/// Pop-in animation played when an object first appears.
///
/// `delay` counts down before the animation starts; `progress` then runs
/// from 0 to 1 over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intro {
    pub delay: f64,
    pub progress: f64,
    pub duration: f64,
}

impl Intro {
    pub const DURATION: f64 = 0.3;

    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            progress: 0.0,
            duration: Self::DURATION,
        }
    }

    /// An intro that has already finished.
    pub fn done() -> Self {
        Self {
            delay: 0.0,
            progress: 1.0,
            duration: Self::DURATION,
        }
    }

    pub fn update(&mut self, dt: f64) {
        if self.delay > 0.0 {
            self.delay -= dt;
            return;
        }
        self.progress = (self.progress + dt / self.duration).min(1.0);
    }

    /// Progress for the draw layer, `None` while still delayed.
    pub fn visible_progress(&self) -> Option<f64> {
        (self.delay <= 0.0).then_some(self.progress)
    }
}

/// Quintic ease-out used by popups.
pub fn ease_out_quint(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(5)
}
