//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy variant. All variants share the same state machine and differ in
/// stats and in their periodic behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[default]
    Zombie,
    Skeleton,
    Witch,
    Poop,
    Cloud,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Zombie,
        EnemyKind::Skeleton,
        EnemyKind::Witch,
        EnemyKind::Poop,
        EnemyKind::Cloud,
    ];

    /// Datapack key of this variant.
    pub fn key(self) -> &'static str {
        match self {
            EnemyKind::Zombie => "zombie",
            EnemyKind::Skeleton => "skeleton",
            EnemyKind::Witch => "witch",
            EnemyKind::Poop => "poop",
            EnemyKind::Cloud => "cloud",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Top-level run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Running,
    Paused,
    /// The castle fell. The run is over and the simulation no longer advances.
    GameOver,
}

/// Wave director state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Counting down to the next wave.
    Intermission { timeout: f64 },
    /// Spawning and fighting the current wave.
    Active,
}

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Space,
    Up,
    Down,
    Left,
    Right,
    /// Printable character, lowercase for letters.
    Char(char),
}

/// What the hover popup is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverKind {
    Object,
    Enemy,
}
