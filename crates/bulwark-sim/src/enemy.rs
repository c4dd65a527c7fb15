//! Enemies: autonomous actors walking toward the castle.
//!
//! Every variant shares one state machine (seeking ⇄ bounced) and differs
//! only in its [`EnemyStats`] row and periodic [`ClockHook`].

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use bulwark_core::constants::ENEMY_HIT_KICK;
use bulwark_core::enums::EnemyKind;
use bulwark_core::motion::{angle_between, VectorCoord};
use bulwark_core::types::Rect;

use crate::anim::Wobble;
use crate::catalog::ProjectileMeta;
use crate::object::{Object, ObjectId};
use crate::projectile::Projectile;

/// Stable handle of an enemy. Never reused within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Periodic attack of a variant, given its resolved attack projectile.
pub type ClockHook = fn(&Enemy, &Arc<ProjectileMeta>) -> Vec<Projectile>;

/// Stat row of an enemy variant.
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub name: &'static str,
    /// Character name shown in the hover popup.
    pub character: &'static str,
    pub sprite: &'static str,
    pub hp: i32,
    /// Cruising speed in tiles per second.
    pub speed: f64,
    /// Seconds between re-aims at the castle (and attacks).
    pub clock: f64,
    /// Hitbox edge in tiles.
    pub size: f64,
    /// Object tags walked over. `None` phases through everything.
    pub phase_through: Option<&'static [&'static str]>,
    /// Speed the enemy bounces away with after hitting an obstacle.
    pub collision_strength: f64,
    /// Crystals credited on kill.
    pub reward: u32,
    /// Projectile template key used by `on_clock`.
    pub attack: Option<&'static str>,
    pub on_clock: Option<ClockHook>,
}

const ZOMBIE: EnemyStats = EnemyStats {
    name: "Zombie",
    character: "Maxwell the Undead",
    sprite: "maxwell.png",
    hp: 7,
    speed: 0.5,
    clock: 0.5,
    size: 0.5,
    phase_through: Some(&[]),
    collision_strength: 1.0,
    reward: 1,
    attack: None,
    on_clock: None,
};

const SKELETON: EnemyStats = EnemyStats {
    name: "Skeleton",
    character: "Rattling Reginald",
    sprite: "skeleton.png",
    hp: 5,
    speed: 0.8,
    clock: 0.5,
    size: 0.5,
    phase_through: Some(&["tree"]),
    collision_strength: 1.5,
    reward: 2,
    attack: None,
    on_clock: None,
};

const WITCH: EnemyStats = EnemyStats {
    name: "Witch",
    character: "Agatha of the Marsh",
    sprite: "witch.png",
    hp: 6,
    speed: 0.4,
    clock: 3.0,
    size: 0.6,
    phase_through: Some(&[]),
    collision_strength: 1.0,
    reward: 4,
    attack: Some("witch_orb"),
    on_clock: Some(witch_attack),
};

const POOP: EnemyStats = EnemyStats {
    name: "Poop",
    character: "Sir Stinksalot",
    sprite: "poop.png",
    hp: 10,
    speed: 0.3,
    clock: 2.0,
    size: 0.5,
    phase_through: Some(&[]),
    collision_strength: 0.5,
    reward: 3,
    attack: Some("stink"),
    on_clock: Some(poop_attack),
};

const CLOUD: EnemyStats = EnemyStats {
    name: "Cloud",
    character: "Drizzle",
    sprite: "cloud.png",
    hp: 4,
    speed: 0.6,
    clock: 2.5,
    size: 0.8,
    phase_through: None,
    collision_strength: 1.0,
    reward: 5,
    attack: Some("raindrop"),
    on_clock: Some(cloud_attack),
};

/// Stat row of `kind`.
pub fn stats(kind: EnemyKind) -> &'static EnemyStats {
    match kind {
        EnemyKind::Zombie => &ZOMBIE,
        EnemyKind::Skeleton => &SKELETON,
        EnemyKind::Witch => &WITCH,
        EnemyKind::Poop => &POOP,
        EnemyKind::Cloud => &CLOUD,
    }
}

/// Homing shot at the castle's current position.
fn witch_attack(enemy: &Enemy, attack: &Arc<ProjectileMeta>) -> Vec<Projectile> {
    vec![Projectile::aimed(Arc::clone(attack), enemy.pos(), enemy.castle).from_enemy()]
}

/// Stationary stink cloud that damages anything under it.
fn poop_attack(enemy: &Enemy, attack: &Arc<ProjectileMeta>) -> Vec<Projectile> {
    vec![Projectile::new(Arc::clone(attack), enemy.pos(), 0.0)
        .from_enemy()
        .destroying_everything()]
}

/// Four raindrops in a cross.
fn cloud_attack(enemy: &Enemy, attack: &Arc<ProjectileMeta>) -> Vec<Projectile> {
    (0..4)
        .map(|i| {
            Projectile::new(Arc::clone(attack), enemy.pos(), i as f64 * FRAC_PI_2).from_enemy()
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    /// Center position and velocity.
    pub motion: VectorCoord,
    pub hp: i32,
    pub max_hp: i32,
    /// Point the enemy walks toward.
    pub castle: DVec2,
    pub clock_timer: f64,
    /// Obstacle currently bounced off, if any.
    pub collided: Option<ObjectId>,
    pub phase_through: Option<Vec<String>>,
    pub wobble: Wobble,
    pub reward: u32,
    pub deletable: bool,
    attack: Option<Arc<ProjectileMeta>>,
}

impl Enemy {
    /// A new enemy of `kind` at `pos`, already walking toward `castle`.
    pub fn new(
        kind: EnemyKind,
        pos: DVec2,
        castle: DVec2,
        attack: Option<Arc<ProjectileMeta>>,
    ) -> Self {
        let stats = stats(kind);
        let mut enemy = Self {
            id: EnemyId(0),
            kind,
            motion: VectorCoord::new(pos, 0.0, 0.0, 0.0).with_subzero_speed(),
            hp: stats.hp,
            max_hp: stats.hp,
            castle,
            clock_timer: 0.0,
            collided: None,
            phase_through: stats
                .phase_through
                .map(|tags| tags.iter().map(|t| (*t).to_owned()).collect()),
            wobble: Wobble::default(),
            reward: stats.reward,
            deletable: false,
            attack,
        };
        enemy.walk_towards(castle);
        enemy
    }

    pub fn stats(&self) -> &'static EnemyStats {
        stats(self.kind)
    }

    pub fn pos(&self) -> DVec2 {
        self.motion.pos
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.motion.pos, DVec2::splat(self.stats().size))
    }

    /// Mirrors the sprite when the castle lies to the left.
    pub fn flip(&self) -> bool {
        self.castle.x < self.motion.pos.x
    }

    pub fn walk_towards(&mut self, target: DVec2) {
        self.motion.point_towards(target);
        self.motion.speed = self.stats().speed;
    }

    pub fn damage(&mut self, amount: i32) {
        self.wobble.kick(ENEMY_HIT_KICK, false, true);
        self.hp -= amount;
        if self.hp <= 0 {
            self.deletable = true;
        }
    }

    /// One frame of movement, combat and collision response.
    ///
    /// Returns the projectiles emitted by the periodic attack.
    pub fn update(
        &mut self,
        dt: f64,
        objects: &mut [Object],
        projectiles: &mut [Projectile],
    ) -> Vec<Projectile> {
        self.motion.update(dt);
        self.wobble.update(dt);

        self.take_projectile_hits(projectiles);
        if self.deletable {
            return Vec::new();
        }

        let mut emitted = Vec::new();
        if self.collided.is_none() {
            self.clock_timer -= dt;
        }
        if self.clock_timer <= 0.0 {
            self.clock_timer = self.stats().clock;
            if let (Some(hook), Some(attack)) = (self.stats().on_clock, self.attack.as_ref()) {
                emitted = hook(self, attack);
            }
            self.walk_towards(self.castle);
        }

        self.check_collisions(objects);

        let cruise = self.stats().speed;
        if self.collided.is_some() {
            self.motion.speed -= dt;
            if self.motion.speed <= 0.0 {
                self.collided = None;
                self.motion.deg += PI;
            }
        } else if self.motion.speed < cruise {
            self.motion.speed = (self.motion.speed + dt).min(cruise);
        }

        emitted
    }

    /// Take damage from every live player-side projectile overlapping the hitbox.
    fn take_projectile_hits(&mut self, projectiles: &mut [Projectile]) {
        let rect = self.rect();
        for projectile in projectiles.iter_mut() {
            if projectile.from_enemy || projectile.spent {
                continue;
            }
            if projectile.rect().collides(&rect) {
                self.damage(projectile.damage);
                projectile.spend();
                if self.deletable {
                    return;
                }
            }
        }
    }

    /// Bounce off the first non-walkable, non-phased object overlapping the
    /// hitbox, skipping the one already bounced off.
    fn check_collisions(&mut self, objects: &mut [Object]) {
        let Some(phase_through) = self.phase_through.as_ref() else {
            return;
        };

        let rect = self.rect();
        let collided = self.collided;
        let hit = objects.iter_mut().find(|obj| {
            Some(obj.id) != collided
                && !obj.is_destroyed()
                && !obj.meta.walkable
                && !obj.tags.iter().any(|tag| phase_through.contains(tag))
                && obj.rect().collides(&rect)
        });

        if let Some(obj) = hit {
            self.motion.deg = angle_between(obj.center(), self.motion.pos) + FRAC_PI_2;
            self.motion.speed = self.stats().collision_strength;
            self.collided = Some(obj.id);
            obj.damage(1);
        }
    }
}
