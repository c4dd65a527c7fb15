//! Polar-velocity position integration shared by every moving entity.
//!
//! Headings follow the draw layer's convention: a heading of `deg` moves the
//! position by `(sin(deg), cos(deg))`, so headings produced by
//! [`angle_between`] are rotated by a quarter turn in [`VectorCoord::point_towards`].

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Position, heading, speed and constant acceleration of a moving entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorCoord {
    pub pos: DVec2,
    /// Heading in radians.
    pub deg: f64,
    pub speed: f64,
    pub acceleration: f64,
    /// Lets speed cross zero instead of clamping at it.
    pub allow_subzero_speed: bool,
}

impl VectorCoord {
    pub fn new(pos: DVec2, deg: f64, speed: f64, acceleration: f64) -> Self {
        Self {
            pos,
            deg,
            speed,
            acceleration,
            allow_subzero_speed: false,
        }
    }

    pub fn with_subzero_speed(mut self) -> Self {
        self.allow_subzero_speed = true;
        self
    }

    /// Aim the heading at `target`.
    pub fn point_towards(&mut self, target: DVec2) {
        self.deg = angle_between(self.pos, target) + FRAC_PI_2;
    }

    /// Unit direction of travel for the current heading.
    pub fn direction(&self) -> DVec2 {
        DVec2::new(self.deg.sin(), self.deg.cos())
    }

    /// Integrate speed and position over `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if self.allow_subzero_speed || self.speed > 0.0 {
            self.speed += self.acceleration * dt;
            if !self.allow_subzero_speed && self.speed < 0.0 {
                self.speed = 0.0;
            }
        }

        self.pos += self.direction() * self.speed * dt;
    }
}

/// Angle from `a` to `b` in radians, normalized into `[0, 2π)`.
///
/// The y axis points down in map space, hence `a.y - b.y`.
pub fn angle_between(a: DVec2, b: DVec2) -> f64 {
    let angle = (a.y - b.y).atan2(b.x - a.x);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Euclidean distance between two points.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Linear interpolation with `t` clamped into `[0, 1]`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    (1.0 - t) * a + t * b
}
