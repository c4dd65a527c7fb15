//! Projectiles: ballistic entities that damage the first thing they touch.

use std::sync::Arc;

use glam::DVec2;

use bulwark_core::motion::VectorCoord;
use bulwark_core::types::Rect;

use crate::catalog::ProjectileMeta;
use crate::object::Object;

/// Seconds over which a projectile fades out before expiring.
const FADE_OUT_SECS: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct Projectile {
    pub meta: Arc<ProjectileMeta>,
    /// Center position and velocity.
    pub motion: VectorCoord,
    /// Seconds left before expiry.
    pub lifetime: f64,
    pub damage: i32,
    /// Object tags this projectile passes through.
    pub phase_through: Vec<String>,
    /// Shot by an enemy. Enemy shots never damage enemies.
    pub from_enemy: bool,
    /// Area attack. Hits walkable objects too.
    pub destroy_everything: bool,
    /// Pruned at the end of the frame.
    pub deletable: bool,
    /// Already damaged its one target.
    pub spent: bool,
}

impl Projectile {
    pub fn new(meta: Arc<ProjectileMeta>, pos: DVec2, deg: f64) -> Self {
        let motion = VectorCoord::new(pos, deg, meta.speed, 0.0);
        Self {
            lifetime: meta.lifetime,
            damage: meta.damage,
            meta,
            motion,
            phase_through: Vec::new(),
            from_enemy: false,
            destroy_everything: false,
            deletable: false,
            spent: false,
        }
    }

    /// A projectile at `pos` heading for `target`.
    pub fn aimed(meta: Arc<ProjectileMeta>, pos: DVec2, target: DVec2) -> Self {
        let mut projectile = Self::new(meta, pos, 0.0);
        projectile.motion.point_towards(target);
        projectile
    }

    pub fn from_enemy(mut self) -> Self {
        self.from_enemy = true;
        self
    }

    pub fn destroying_everything(mut self) -> Self {
        self.destroy_everything = true;
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn ignoring(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.phase_through.extend(tags);
        self
    }

    pub fn pos(&self) -> DVec2 {
        self.motion.pos
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.motion.pos, self.meta.size)
    }

    /// Sprite rotation, zero for templates that do not rotate.
    pub fn rotation(&self) -> f64 {
        if self.meta.rotate {
            self.motion.deg
        } else {
            0.0
        }
    }

    pub fn opacity(&self) -> f64 {
        (self.lifetime / FADE_OUT_SECS).clamp(0.0, 1.0)
    }

    /// Whether this projectile would hit `obj` on contact.
    pub fn can_hit(&self, obj: &Object) -> bool {
        if obj.is_destroyed() {
            return false;
        }
        if obj.meta.walkable && !self.destroy_everything {
            return false;
        }
        !obj.tags.iter().any(|tag| self.phase_through.contains(tag))
    }

    /// Mark the single hit of this projectile as used.
    pub fn spend(&mut self) {
        self.spent = true;
        self.deletable = true;
    }

    /// Move, age, and damage the first object hit.
    pub fn update(&mut self, dt: f64, objects: &mut [Object]) {
        self.motion.update(dt);

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.deletable = true;
        }

        if self.spent {
            return;
        }

        let rect = self.rect();
        if let Some(obj) = objects
            .iter_mut()
            .find(|obj| self.can_hit(obj) && obj.rect().collides(&rect))
        {
            obj.damage(self.damage);
            self.spend();
        }
    }
}
