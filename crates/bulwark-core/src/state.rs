//! Game snapshot: everything the drawing layer needs to paint one frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{SimTime, TilePos};

/// Complete drawable state produced after each update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub objects: Vec<ObjectView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub hud: HudView,
    pub hover: Option<HoverView>,
    pub builder: Option<BuilderView>,
    pub camera: CameraView,
}

/// A map object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: u32,
    pub name: String,
    pub sprite: String,
    pub tile: TilePos,
    /// Footprint in tiles.
    pub size: (i32, i32),
    /// Intro animation progress, 0.0 to 1.0. `None` while still waiting to
    /// appear.
    pub intro: Option<f64>,
    /// Current wobble magnitude.
    pub wobble: f64,
    /// Current wobble phase in radians.
    pub wobble_phase: f64,
    pub hp: i32,
    pub max_hp: i32,
}

/// An enemy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyView {
    pub kind: EnemyKind,
    pub name: String,
    pub sprite: String,
    /// Center position in map space.
    pub pos: DVec2,
    /// Size in tiles.
    pub size: DVec2,
    /// Whether the sprite should be mirrored (walking toward -x of the castle).
    pub flip: bool,
    pub wobble: f64,
    pub wobble_phase: f64,
    pub hp: i32,
    pub max_hp: i32,
}

/// A projectile in flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileView {
    pub sprite: String,
    pub pos: DVec2,
    pub size: DVec2,
    /// Rotation in radians, zero for projectiles that do not rotate.
    pub rotation: f64,
    /// Fades out over the final part of the lifetime.
    pub opacity: f64,
}

/// Numbers for the heads-up display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudView {
    pub wave: u32,
    pub wave_phase: Option<WavePhase>,
    pub enemies_remaining: u32,
    /// Smoothed wallet readouts.
    pub wood: f64,
    pub crystals: f64,
    pub kills: f64,
    pub cursor_level: u32,
    pub cursor_damage: i32,
    /// Kill count of the next cursor upgrade, if any remain.
    pub next_upgrade_kills: Option<u32>,
    /// Remaining click cooldown as a fraction of the full cooldown.
    pub cursor_cooldown: f64,
    /// Progress of the current hold-to-sell, 0.0 to 1.0.
    pub sell_progress: f64,
}

/// Popup describing the hovered entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverView {
    pub kind: HoverKind,
    pub name: String,
    /// Character name for enemies.
    pub subtitle: Option<String>,
    pub hp: i32,
    pub max_hp: i32,
    /// Eased fade-in progress, 0.0 to 1.0.
    pub fade: f64,
}

/// Placement preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderView {
    pub name: String,
    pub sprite: String,
    pub tile: Option<TilePos>,
    pub size: (i32, i32),
    pub placeable: bool,
    pub remaining: Option<u32>,
}

/// Camera transform from map space to screen pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CameraView {
    pub offset: DVec2,
    pub zoom: f64,
}
