//! Object system: animations and clock behaviors of every map object.

use rand_chacha::ChaCha8Rng;

use crate::map::Map;
use crate::object::{ObjectEvent, ObjectId};

/// Update every object, inject the projectiles they emit and remove the
/// ones that asked to be deleted.
///
/// Returns the ids removed this frame.
pub fn run(map: &mut Map, dt: f64, rng: &mut ChaCha8Rng) -> Vec<ObjectId> {
    let mut deleted = Vec::new();
    let mut spawned = Vec::new();

    for obj in map.objects.iter_mut() {
        for event in obj.update(dt, &map.enemies, rng) {
            match event {
                ObjectEvent::Delete => deleted.push(obj.id),
                ObjectEvent::SpawnProjectile(projectile) => spawned.push(projectile),
            }
        }
    }

    map.projectiles.extend(spawned);
    map.remove_objects(&deleted);
    deleted
}
