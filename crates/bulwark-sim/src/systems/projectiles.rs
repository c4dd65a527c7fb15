//! Projectile system: flight, expiry and object hits.

use crate::map::Map;

pub fn run(map: &mut Map, dt: f64) {
    for projectile in map.projectiles.iter_mut() {
        projectile.update(dt, &mut map.objects);
    }
}
