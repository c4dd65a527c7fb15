//! Map objects: destructible instances of an [`ObjMeta`] template.

use std::sync::Arc;

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use bulwark_core::constants::{OBJECT_HIT_KICK, TOWER_RECOIL_KICK};
use bulwark_core::motion::distance;
use bulwark_core::types::{Rect, TilePos};

use crate::anim::{Intro, Wobble};
use crate::catalog::{ObjBehavior, ObjMeta};
use crate::enemy::Enemy;
use crate::projectile::Projectile;

/// Stable handle of an object on the map. Never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Outbound request of an object, interpreted by the engine.
#[derive(Debug, Clone)]
pub enum ObjectEvent {
    /// Remove this object from the map.
    Delete,
    SpawnProjectile(Projectile),
}

#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    pub meta: Arc<ObjMeta>,
    /// Sprite chosen at creation.
    pub image: String,
    /// Top-left tile of the footprint.
    pub pos: TilePos,
    pub tags: Vec<String>,
    pub hp: i32,
    pub wobble: Wobble,
    pub intro: Intro,
    clock_timer: f64,
    events: Vec<ObjectEvent>,
    destroyed: bool,
}

impl Object {
    /// A fresh instance of `meta` at `pos`. The id is assigned by the map.
    pub fn new(meta: Arc<ObjMeta>, pos: TilePos, rng: &mut ChaCha8Rng) -> Self {
        Self {
            id: ObjectId(0),
            image: meta.pick_image(rng),
            pos,
            tags: meta.tags.clone(),
            hp: meta.hp,
            wobble: Wobble::default(),
            intro: Intro::done(),
            clock_timer: meta.clock.unwrap_or(0.0),
            events: Vec::new(),
            destroyed: false,
            meta,
        }
    }

    pub fn with_intro_delay(mut self, delay: f64) -> Self {
        self.intro = Intro::new(delay);
        self
    }

    pub fn max_hp(&self) -> i32 {
        self.meta.hp
    }

    /// HP reached zero or the object was removed. Pruned at the end of the frame.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Bounding rect of the footprint in map space.
    pub fn rect(&self) -> Rect {
        Rect::from_corner(self.pos.as_vec(), self.meta.size_vec())
    }

    pub fn center(&self) -> DVec2 {
        self.rect().center()
    }

    pub fn occupies(&self, tile: TilePos) -> bool {
        self.meta.footprint(self.pos).any(|t| t == tile)
    }

    pub fn footprint(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.meta.footprint(self.pos)
    }

    pub fn kick(&mut self, strength: f64) {
        self.wobble.kick(strength, false, true);
    }

    /// Subtract `amount` HP. The first time HP drops to zero a single
    /// [`ObjectEvent::Delete`] is queued.
    pub fn damage(&mut self, amount: i32) {
        self.hp -= amount.max(0);
        self.kick(OBJECT_HIT_KICK);
        if self.hp <= 0 {
            self.mark_deleted();
        }
    }

    /// Queue removal regardless of HP.
    pub fn mark_deleted(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.events.push(ObjectEvent::Delete);
        }
    }

    /// Advance animations and the periodic behavior, then drain the event queue.
    pub fn update(
        &mut self,
        dt: f64,
        enemies: &[Enemy],
        rng: &mut ChaCha8Rng,
    ) -> Vec<ObjectEvent> {
        self.wobble.update(dt);
        self.intro.update(dt);

        if let Some(interval) = self.meta.clock {
            if !self.destroyed {
                self.clock_timer -= dt;
                if self.clock_timer <= 0.0 {
                    self.clock_timer = interval;
                    self.on_clock(enemies, rng);
                }
            }
        }

        std::mem::take(&mut self.events)
    }

    fn on_clock(&mut self, enemies: &[Enemy], rng: &mut ChaCha8Rng) {
        let meta = Arc::clone(&self.meta);
        match &meta.behavior {
            ObjBehavior::Inert => {}
            ObjBehavior::Tower {
                range,
                projectile,
                ignore_tags,
            } => {
                let center = self.center();
                let target = enemies.iter().find(|enemy| {
                    let pos = enemy.pos();
                    !enemy.deletable
                        && (pos.x - center.x).abs() <= *range
                        && (pos.y - center.y).abs() <= *range
                        && distance(center, pos) <= *range
                });

                if let Some(enemy) = target {
                    let shot = Projectile::aimed(Arc::clone(projectile), center, enemy.pos())
                        .ignoring(self.tags.iter().chain(ignore_tags).cloned());
                    self.wobble.kick(TOWER_RECOIL_KICK, false, true);
                    self.events.push(ObjectEvent::SpawnProjectile(shot));
                }
            }
            ObjBehavior::Landmine { projectile, damage } => {
                let rect = self.rect();
                let triggered = enemies
                    .iter()
                    .any(|enemy| !enemy.deletable && enemy.rect().collides(&rect));

                if triggered {
                    self.mark_deleted();
                    let roll = rng.gen_range(damage.0..=damage.1);
                    let blast = Projectile::new(Arc::clone(projectile), self.center(), 0.0)
                        .destroying_everything()
                        .with_damage(roll)
                        .ignoring(self.tags.iter().cloned());
                    self.events.push(ObjectEvent::SpawnProjectile(blast));
                }
            }
        }
    }
}
