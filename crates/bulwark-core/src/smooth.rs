//! Exponential-decay scalar used for cosmetic counters.

use serde::{Deserialize, Serialize};

/// A value that eases toward its target, snapping once it is indistinguishable
/// from the target at the configured decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SValue {
    value: f64,
    target: f64,
    /// Fraction of the remaining distance covered per second.
    smoothness: f64,
    /// Decimal places compared when deciding to snap.
    precision: i32,
}

impl SValue {
    pub fn new(value: f64, smoothness: f64, precision: i32) -> Self {
        Self {
            value,
            target: value,
            smoothness,
            precision,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Value rounded to the configured precision.
    pub fn rounded(&self) -> f64 {
        round_to(self.value, self.precision)
    }

    pub fn settled(&self) -> bool {
        self.value == self.target
    }

    /// Set a new target, keeping the current value.
    pub fn set(&mut self, target: f64) {
        self.target = target;
    }

    /// Jump straight to `value`, discarding any pending motion.
    pub fn jump(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }

    pub fn update(&mut self, dt: f64) {
        if self.settled() {
            return;
        }

        let step = (self.smoothness * dt).clamp(0.0, 1.0);
        self.value += (self.target - self.value) * step;

        if round_to(self.value, self.precision) == round_to(self.target, self.precision) {
            self.value = self.target;
        }
    }
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}
