//! Simulation engine for BULWARK.
//!
//! Owns the map and every entity on it, runs the per-frame systems in a
//! fixed order, and produces GameSnapshots for the drawing layer.

pub mod anim;
pub mod biome;
pub mod camera;
pub mod catalog;
pub mod cheats;
pub mod economy;
pub mod enemy;
pub mod engine;
pub mod map;
pub mod object;
pub mod projectile;
pub mod systems;
pub mod wave;

pub use bulwark_core as core;
pub use engine::{Game, GameConfig};

#[cfg(test)]
mod tests;
