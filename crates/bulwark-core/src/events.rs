//! Events emitted by the simulation for the scene manager, audio and UI.

use serde::{Deserialize, Serialize};

use crate::enums::EnemyKind;
use crate::types::TilePos;

/// Final statistics of a run, handed to the scene manager on game over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub kills: u32,
    /// Highest wave reached.
    pub wave: u32,
    pub wood: u32,
    pub crystals: u32,
    pub cursor_level: u32,
    pub elapsed_secs: f64,
}

/// Outbound notifications produced during a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Intermission ended and spawning began.
    WaveStarted { wave: u32, enemies: u32 },
    /// Every enemy of the wave was spawned and killed.
    WaveCleared { wave: u32 },
    EnemyKilled { kind: EnemyKind, reward: u32 },
    /// A clickable object was destroyed by the player.
    ObjectHarvested {
        name: String,
        tile: TilePos,
        wood: u32,
        crystals: u32,
    },
    ObjectSold {
        name: String,
        tile: TilePos,
        wood: u32,
        crystals: u32,
    },
    ObjectPlaced { name: String, tile: TilePos },
    CursorUpgraded { level: u32 },
    CheatActivated { code: String },
    Paused,
    Resumed,
    /// The castle fell.
    RunEnded { summary: RunSummary },
}
