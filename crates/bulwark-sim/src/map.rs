//! The map, authoritative owner of every object, enemy and projectile.

use glam::DVec2;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::constants::{INTRO_STAGGER_SECS, SPAWN_RETRY_LIMIT};
use bulwark_core::types::{GridSize, TilePos};

use crate::biome::Biome;
use crate::catalog::ObjMeta;
use crate::enemy::{Enemy, EnemyId};
use crate::object::{Object, ObjectId};
use crate::projectile::Projectile;

#[derive(Debug, Clone)]
pub struct Map {
    pub size: GridSize,
    pub objects: Vec<Object>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub biome: Biome,
    /// Impassable water tiles from the map layout.
    pub water: Vec<TilePos>,
    /// Flat list of tiles covered by object footprints.
    occupied: Vec<TilePos>,
    next_object_id: u32,
    next_enemy_id: u32,
}

impl Map {
    pub fn new(size: GridSize, water: Vec<TilePos>, biome: Biome) -> Self {
        Self {
            size,
            objects: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            biome,
            water,
            occupied: Vec::new(),
            next_object_id: 1,
            next_enemy_id: 1,
        }
    }

    /// Add an object, assigning its id, and rebuild occupancy.
    pub fn add_object(&mut self, mut obj: Object) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        obj.id = id;
        self.objects.push(obj);
        self.update_occupancy();
        id
    }

    pub fn add_enemy(&mut self, mut enemy: Enemy) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        enemy.id = id;
        self.enemies.push(enemy);
        id
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Rebuild the occupancy list from every object footprint.
    pub fn update_occupancy(&mut self) {
        self.occupied.clear();
        for obj in &self.objects {
            self.occupied.extend(obj.footprint());
        }
    }

    pub fn occupied(&self) -> &[TilePos] {
        &self.occupied
    }

    pub fn is_occupied(&self, tile: TilePos) -> bool {
        self.occupied.contains(&tile)
    }

    pub fn is_water(&self, tile: TilePos) -> bool {
        self.water.contains(&tile)
    }

    /// Whether `meta` fits with its top-left tile at `origin`: every
    /// footprint tile on the map, free and dry.
    pub fn can_place(&self, meta: &ObjMeta, origin: TilePos) -> bool {
        meta.footprint(origin)
            .all(|tile| self.size.contains(tile) && !self.is_occupied(tile) && !self.is_water(tile))
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.iter_mut().find(|obj| obj.id == id)
    }

    /// Topmost live object covering `tile`.
    pub fn object_at(&self, tile: TilePos) -> Option<&Object> {
        self.objects
            .iter()
            .rev()
            .find(|obj| !obj.is_destroyed() && obj.occupies(tile))
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    /// Topmost live enemy whose hitbox contains `point`.
    pub fn enemy_at_point(&self, point: DVec2) -> Option<&Enemy> {
        self.enemies
            .iter()
            .rev()
            .find(|enemy| !enemy.deletable && enemy.rect().contains_point(point))
    }

    /// Remove the given objects and rebuild occupancy.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) {
        if ids.is_empty() {
            return;
        }
        self.objects.retain(|obj| !ids.contains(&obj.id));
        self.update_occupancy();
    }

    /// Fill free, dry tiles with biome rolls, each tile with probability `chance`.
    ///
    /// Returns the number of objects placed.
    pub fn populate_empty(&mut self, chance: f64, rng: &mut ChaCha8Rng) -> usize {
        let chance = chance.clamp(0.0, 1.0);
        let mut placed = 0;
        let mut stagger = 0.0;

        for y in 0..self.size.height {
            for x in 0..self.size.width {
                let tile = TilePos::new(x, y);
                if self.is_occupied(tile) || self.is_water(tile) {
                    continue;
                }
                if !rng.gen_bool(chance) {
                    continue;
                }
                let Some(meta) = self.biome.random_template(rng) else {
                    continue;
                };
                if !self.can_place(&meta, tile) {
                    continue;
                }

                let obj = Object::new(meta, tile, rng).with_intro_delay(stagger);
                self.add_object(obj);
                stagger += INTRO_STAGGER_SECS;
                placed += 1;
            }
        }

        placed
    }

    /// Every tile on the outer ring, clockwise from the top-left corner.
    pub fn edge_tiles(&self) -> Vec<TilePos> {
        let (w, h) = (self.size.width, self.size.height);
        if w <= 0 || h <= 0 {
            return Vec::new();
        }

        let mut tiles = Vec::new();
        tiles.extend((0..w).map(|x| TilePos::new(x, 0)));
        tiles.extend((1..h).map(|y| TilePos::new(w - 1, y)));
        if h > 1 {
            tiles.extend((0..w - 1).rev().map(|x| TilePos::new(x, h - 1)));
        }
        if w > 1 {
            tiles.extend((1..h - 1).rev().map(|y| TilePos::new(0, y)));
        }
        tiles
    }

    /// A random free edge tile. After [`SPAWN_RETRY_LIMIT`] failed attempts
    /// the last candidate is accepted even if occupied.
    pub fn random_spawn_tile(&self, rng: &mut ChaCha8Rng) -> Option<TilePos> {
        let edges = self.edge_tiles();
        let mut candidate = *edges.choose(rng)?;

        for _ in 1..SPAWN_RETRY_LIMIT {
            if !self.is_occupied(candidate) && !self.is_water(candidate) {
                return Some(candidate);
            }
            candidate = *edges.choose(rng)?;
        }

        if self.is_occupied(candidate) || self.is_water(candidate) {
            log::debug!(
                "No free edge tile after {SPAWN_RETRY_LIMIT} attempts, spawning at ({}, {})",
                candidate.x,
                candidate.y
            );
        }
        Some(candidate)
    }
}
