//! Template catalog: datapack keys resolved into shared, immutable templates.
//!
//! Every key reference in the datapack is resolved here, once, when a game is
//! created. A dangling key is a load-time [`DatapackError`], except an
//! unknown enemy key in wave data, which is logged and replaced by the zombie.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::DVec2;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use bulwark_core::constants::{CASTLE_HP, CASTLE_SIZE};
use bulwark_core::datapack::*;
use bulwark_core::enums::EnemyKind;
use bulwark_core::types::TilePos;

use crate::biome::Biome;
use crate::economy::{Cost, CursorUpgrade, ShopOffer};
use crate::enemy::{self, Enemy};
use crate::wave::{Wave, WaveEnemy};

/// Immutable object template shared by every instance placed from it.
#[derive(Debug, Clone)]
pub struct ObjMeta {
    pub key: String,
    pub name: String,
    /// Candidate sprites; each instance picks one at creation.
    pub images: Vec<String>,
    /// Footprint bounding box in tiles.
    pub size: (i32, i32),
    /// Occupied tile offsets relative to the top-left tile.
    pub tiles: Vec<TilePos>,
    pub tags: Vec<String>,
    pub hp: i32,
    pub player_damage: bool,
    pub player_sell: bool,
    pub walkable: bool,
    pub wood: u32,
    pub crystals: u32,
    /// Interval of the periodic behavior in seconds.
    pub clock: Option<f64>,
    pub behavior: ObjBehavior,
}

/// Periodic behavior variants of object templates.
#[derive(Debug, Clone, Default)]
pub enum ObjBehavior {
    #[default]
    Inert,
    /// Shoots at the first enemy in list order within `range` tiles.
    Tower {
        range: f64,
        projectile: Arc<ProjectileMeta>,
        /// Tags the shots pass through, on top of the tower's own tags.
        ignore_tags: Vec<String>,
    },
    /// Explodes once when an enemy overlaps the footprint.
    Landmine {
        projectile: Arc<ProjectileMeta>,
        /// Inclusive damage roll of the explosion.
        damage: (i32, i32),
    },
}

impl ObjMeta {
    /// A plain 1-tile-per-cell template with one hit point and no behavior.
    pub fn new(key: &str, name: &str, size: (i32, i32)) -> Self {
        Self {
            key: key.to_owned(),
            name: name.to_owned(),
            images: vec![format!("{key}.png")],
            size,
            tiles: full_footprint(size),
            tags: Vec::new(),
            hp: 1,
            player_damage: false,
            player_sell: false,
            walkable: false,
            wood: 0,
            crystals: 0,
            clock: None,
            behavior: ObjBehavior::Inert,
        }
    }

    /// The castle every enemy walks toward.
    pub fn castle() -> Self {
        Self::new("castle", "Castle", CASTLE_SIZE)
            .with_hp(CASTLE_HP)
            .with_tags(&["castle", "player"])
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    pub fn with_images(mut self, images: &[&str]) -> Self {
        self.images = images.iter().map(|i| (*i).to_owned()).collect();
        self
    }

    pub fn walkable(mut self) -> Self {
        self.walkable = true;
        self
    }

    pub fn clickable(mut self) -> Self {
        self.player_damage = true;
        self
    }

    pub fn sellable(mut self) -> Self {
        self.player_sell = true;
        self
    }

    pub fn with_yields(mut self, wood: u32, crystals: u32) -> Self {
        self.wood = wood;
        self.crystals = crystals;
        self
    }

    pub fn with_behavior(mut self, clock: f64, behavior: ObjBehavior) -> Self {
        self.clock = Some(clock);
        self.behavior = behavior;
        self
    }

    /// Pick the sprite of a new instance.
    pub fn pick_image(&self, rng: &mut ChaCha8Rng) -> String {
        self.images.choose(rng).cloned().unwrap_or_default()
    }

    pub fn size_vec(&self) -> DVec2 {
        DVec2::new(self.size.0 as f64, self.size.1 as f64)
    }

    /// Absolute tiles covered when the top-left tile is `origin`.
    pub fn footprint(&self, origin: TilePos) -> impl Iterator<Item = TilePos> + '_ {
        self.tiles.iter().map(move |offset| origin.offset(*offset))
    }

    fn from_def(key: &str, def: &ObjectDef, behavior: ObjBehavior) -> Self {
        let tiles = match &def.tiles {
            Some(tiles) => tiles.iter().map(|&t| TilePos::from(t)).collect(),
            None => full_footprint(def.size),
        };
        Self {
            key: key.to_owned(),
            name: def.name.clone(),
            images: def.images.clone(),
            size: def.size,
            tiles,
            tags: def.tags.clone(),
            hp: def.hp,
            player_damage: def.player_damage,
            player_sell: def.player_sell,
            walkable: def.walkable,
            wood: def.wood,
            crystals: def.crystals,
            clock: def.clock,
            behavior,
        }
    }
}

fn full_footprint(size: (i32, i32)) -> Vec<TilePos> {
    let mut tiles = Vec::with_capacity((size.0.max(0) * size.1.max(0)) as usize);
    for y in 0..size.1 {
        for x in 0..size.0 {
            tiles.push(TilePos::new(x, y));
        }
    }
    tiles
}

/// Immutable projectile template.
#[derive(Debug, Clone)]
pub struct ProjectileMeta {
    pub key: String,
    pub image: String,
    /// Hitbox size in tiles.
    pub size: DVec2,
    pub speed: f64,
    pub damage: i32,
    /// Sprite rotates to face the direction of travel.
    pub rotate: bool,
    /// Seconds before the projectile expires.
    pub lifetime: f64,
}

impl ProjectileMeta {
    pub fn new(key: &str, speed: f64, damage: i32, lifetime: f64) -> Self {
        Self {
            key: key.to_owned(),
            image: format!("{key}.png"),
            size: DVec2::splat(0.25),
            speed,
            damage,
            rotate: false,
            lifetime,
        }
    }

    pub fn with_size(mut self, w: f64, h: f64) -> Self {
        self.size = DVec2::new(w, h);
        self
    }

    fn from_def(key: &str, def: &ProjectileDef) -> Self {
        Self {
            key: key.to_owned(),
            image: def.image.clone(),
            size: DVec2::new(def.size.0, def.size.1),
            speed: def.speed,
            damage: def.damage,
            rotate: def.rotate,
            lifetime: def.lifetime,
        }
    }
}

/// A wave preset resolved into its schedule and cursor progression.
#[derive(Debug, Clone)]
pub struct WavePreset {
    pub enemies: Vec<WaveEnemy>,
    pub cursor_upgrades: Vec<CursorUpgrade>,
}

/// Every resolved template of a datapack.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objects: BTreeMap<String, Arc<ObjMeta>>,
    projectiles: BTreeMap<String, Arc<ProjectileMeta>>,
    biomes: BTreeMap<String, Biome>,
    waves: BTreeMap<String, WavePreset>,
    shop: Vec<ShopOffer>,
    enemy_attacks: HashMap<EnemyKind, Arc<ProjectileMeta>>,
}

impl Catalog {
    /// Resolve every key of `pack`, failing on the first dangling reference.
    pub fn from_datapack(pack: &Datapack) -> Result<Self, DatapackError> {
        let projectiles: BTreeMap<String, Arc<ProjectileMeta>> = pack
            .projectiles
            .iter()
            .map(|(key, def)| (key.clone(), Arc::new(ProjectileMeta::from_def(key, def))))
            .collect();

        let find_projectile = |key: &str| {
            projectiles
                .get(key)
                .cloned()
                .ok_or_else(|| DatapackError::UnknownProjectile(key.to_owned()))
        };

        let mut objects = BTreeMap::new();
        for (key, def) in &pack.objects {
            let behavior = match &def.behavior {
                None => ObjBehavior::Inert,
                Some(BehaviorDef::Tower {
                    range,
                    projectile,
                    ignore_tags,
                }) => ObjBehavior::Tower {
                    range: *range,
                    projectile: find_projectile(projectile)?,
                    ignore_tags: ignore_tags.clone(),
                },
                Some(BehaviorDef::Landmine { projectile, damage }) => ObjBehavior::Landmine {
                    projectile: find_projectile(projectile)?,
                    damage: (damage.0.min(damage.1), damage.0.max(damage.1)),
                },
            };
            objects.insert(key.clone(), Arc::new(ObjMeta::from_def(key, def, behavior)));
        }

        let find_object = |key: &str| {
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| DatapackError::UnknownObject(key.to_owned()))
        };

        let mut biomes = BTreeMap::new();
        for (key, def) in &pack.biomes {
            let mut entries = Vec::with_capacity(def.objects.len());
            for entry in &def.objects {
                entries.push((find_object(&entry.object)?, entry.weight));
            }
            let biome = Biome::new(entries, def.empty_chance, def.regrow_chance)
                .ok_or_else(|| DatapackError::InvalidWeights(key.clone()))?;
            biomes.insert(key.clone(), biome);
        }

        let mut waves = BTreeMap::new();
        for (key, def) in &pack.waves {
            let enemies = def
                .enemies
                .iter()
                .map(|e| {
                    let kind = EnemyKind::from_key(&e.enemy).unwrap_or_else(|| {
                        log::warn!(
                            "Wave preset `{key}` names unknown enemy `{}`, using zombie",
                            e.enemy
                        );
                        EnemyKind::Zombie
                    });
                    WaveEnemy::new(kind, e.starting_wave, e.amount, e.max_amount, e.increase)
                })
                .collect();

            let cursor_upgrades: Vec<CursorUpgrade> = def
                .cursor_upgrades
                .iter()
                .map(|u| CursorUpgrade {
                    kills: u.kills,
                    damage: u.damage,
                    cooldown: u.cooldown,
                })
                .collect();
            if cursor_upgrades.windows(2).any(|w| w[0].kills >= w[1].kills) {
                return Err(DatapackError::UnsortedCursorUpgrades(key.clone()));
            }

            waves.insert(
                key.clone(),
                WavePreset {
                    enemies,
                    cursor_upgrades,
                },
            );
        }

        let mut shop = Vec::with_capacity(pack.shop.len());
        for offer in &pack.shop {
            let template = objects
                .get(&offer.object)
                .cloned()
                .ok_or_else(|| DatapackError::UnknownShopObject(offer.object.clone()))?;
            shop.push(ShopOffer {
                template,
                cost: Cost::new(offer.wood, offer.crystals),
                limit: offer.limit,
            });
        }

        let mut enemy_attacks = HashMap::new();
        for kind in EnemyKind::ALL {
            if let Some(key) = enemy::stats(kind).attack {
                enemy_attacks.insert(kind, find_projectile(key)?);
            }
        }

        Ok(Self {
            objects,
            projectiles,
            biomes,
            waves,
            shop,
            enemy_attacks,
        })
    }

    /// Catalog of the datapack shipped with the game.
    pub fn builtin() -> Result<Self, DatapackError> {
        Self::from_datapack(&Datapack::builtin()?)
    }

    pub fn object(&self, key: &str) -> Result<Arc<ObjMeta>, DatapackError> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| DatapackError::UnknownObject(key.to_owned()))
    }

    pub fn projectile(&self, key: &str) -> Result<Arc<ProjectileMeta>, DatapackError> {
        self.projectiles
            .get(key)
            .cloned()
            .ok_or_else(|| DatapackError::UnknownProjectile(key.to_owned()))
    }

    pub fn biome(&self, key: &str) -> Result<Biome, DatapackError> {
        self.biomes
            .get(key)
            .cloned()
            .ok_or_else(|| DatapackError::UnknownBiome(key.to_owned()))
    }

    pub fn wave_preset(&self, key: &str) -> Result<WavePreset, DatapackError> {
        self.waves
            .get(key)
            .cloned()
            .ok_or_else(|| DatapackError::UnknownWavePreset(key.to_owned()))
    }

    /// Wave of a preset, before its first `next_wave`.
    pub fn wave(&self, key: &str) -> Result<Wave, DatapackError> {
        Ok(Wave::new(self.wave_preset(key)?.enemies))
    }

    pub fn shop(&self) -> &[ShopOffer] {
        &self.shop
    }

    /// Construct an enemy of `kind` at `pos` walking toward `castle`.
    pub fn enemy(&self, kind: EnemyKind, pos: DVec2, castle: DVec2) -> Enemy {
        Enemy::new(kind, pos, castle, self.enemy_attacks.get(&kind).cloned())
    }
}
