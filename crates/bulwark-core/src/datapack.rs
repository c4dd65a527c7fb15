//! Datapack feed: static template, biome, wave and shop definitions.
//!
//! The simulation consumes these already-parsed values. Resolution of keys
//! into shared templates happens once at load time in the simulation crate,
//! and every dangling key is reported as a [`DatapackError`] there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_DATAPACK: &str = include_str!("../data/default_datapack.json");

/// All static game content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Datapack {
    pub objects: BTreeMap<String, ObjectDef>,
    pub projectiles: BTreeMap<String, ProjectileDef>,
    pub biomes: BTreeMap<String, BiomeDef>,
    pub waves: BTreeMap<String, WavePresetDef>,
    #[serde(default)]
    pub shop: Vec<ShopOfferDef>,
}

impl Datapack {
    pub fn from_json(json: &str) -> Result<Self, DatapackError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The datapack shipped with the game.
    pub fn builtin() -> Result<Self, DatapackError> {
        Self::from_json(BUILTIN_DATAPACK)
    }
}

/// Static fields of an object template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub images: Vec<String>,
    #[serde(default = "default_size")]
    pub size: (i32, i32),
    /// Explicit footprint offsets. Defaults to the full `size` rectangle.
    #[serde(default)]
    pub tiles: Option<Vec<(i32, i32)>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_hp")]
    pub hp: i32,
    /// Can be damaged by clicking.
    #[serde(default)]
    pub player_damage: bool,
    /// Can be sold by holding the primary button.
    #[serde(default)]
    pub player_sell: bool,
    /// Enemies and ordinary projectiles pass through.
    #[serde(default)]
    pub walkable: bool,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub crystals: u32,
    /// Interval of the periodic behavior in seconds.
    #[serde(default)]
    pub clock: Option<f64>,
    #[serde(default)]
    pub behavior: Option<BehaviorDef>,
}

/// Periodic behavior of an object template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BehaviorDef {
    /// Shoots `projectile` at the first enemy within `range` tiles.
    Tower {
        range: f64,
        projectile: String,
        /// Extra tags the shots pass through, on top of the tower's own tags.
        #[serde(default)]
        ignore_tags: Vec<String>,
    },
    /// Explodes once when an enemy steps on it.
    Landmine {
        projectile: String,
        #[serde(default = "default_landmine_damage")]
        damage: (i32, i32),
    },
}

/// Static fields of a projectile template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileDef {
    pub image: String,
    #[serde(default = "default_projectile_size")]
    pub size: (f64, f64),
    pub speed: f64,
    pub damage: i32,
    /// Sprite rotates to face the direction of travel.
    #[serde(default)]
    pub rotate: bool,
    #[serde(default = "default_lifetime")]
    pub lifetime: f64,
}

/// Weighted object table of a biome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeDef {
    pub objects: Vec<BiomeEntryDef>,
    /// Probability that a population roll yields nothing.
    pub empty_chance: f64,
    /// Per-tile population chance applied after each cleared wave.
    #[serde(default = "default_regrow_chance")]
    pub regrow_chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeEntryDef {
    pub object: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Enemy schedule and cursor progression of a difficulty preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavePresetDef {
    pub enemies: Vec<WaveEnemyDef>,
    #[serde(default)]
    pub cursor_upgrades: Vec<CursorUpgradeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveEnemyDef {
    /// Enemy key. Unknown keys fall back to the zombie.
    pub enemy: String,
    pub starting_wave: u32,
    pub amount: u32,
    pub max_amount: u32,
    /// Inclusive range added to `amount` every wave past the starting one.
    pub increase: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorUpgradeDef {
    /// Kill count at which the upgrade applies.
    pub kills: u32,
    #[serde(default)]
    pub damage: i32,
    /// Seconds removed from the click cooldown.
    #[serde(default)]
    pub cooldown: f64,
}

/// A purchasable structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopOfferDef {
    pub object: String,
    #[serde(default)]
    pub wood: u32,
    #[serde(default)]
    pub crystals: u32,
    /// Placements allowed per purchase. `None` means unlimited.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Load-time datapack and layout errors.
#[derive(Debug, Error)]
pub enum DatapackError {
    #[error("datapack is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown object template `{0}`")]
    UnknownObject(String),
    #[error("unknown projectile template `{0}`")]
    UnknownProjectile(String),
    #[error("unknown biome `{0}`")]
    UnknownBiome(String),
    #[error("unknown wave preset `{0}`")]
    UnknownWavePreset(String),
    #[error("shop offers unknown object template `{0}`")]
    UnknownShopObject(String),
    #[error("biome `{0}` has no positive weights")]
    InvalidWeights(String),
    #[error("cursor upgrade thresholds of `{0}` are not strictly increasing")]
    UnsortedCursorUpgrades(String),
    #[error("map size {width}x{height} is empty")]
    InvalidMapSize { width: i32, height: i32 },
    #[error("castle at ({x}, {y}) does not fit on the map")]
    CastleOutOfBounds { x: i32, y: i32 },
}

fn default_size() -> (i32, i32) {
    (1, 1)
}

fn default_hp() -> i32 {
    1
}

fn default_landmine_damage() -> (i32, i32) {
    crate::constants::LANDMINE_DAMAGE
}

fn default_projectile_size() -> (f64, f64) {
    (0.25, 0.25)
}

fn default_lifetime() -> f64 {
    3.0
}

fn default_regrow_chance() -> f64 {
    0.02
}

fn default_weight() -> f64 {
    1.0
}
