//! Enemy system: movement, attacks and collisions of every live enemy.

use bulwark_core::constants::WATER_TIME_SCALE;
use bulwark_core::types::TilePos;

use crate::map::Map;

/// Update every enemy. Enemies on water run at [`WATER_TIME_SCALE`].
///
/// Projectiles emitted by enemy attacks join the map after the pass.
pub fn run(map: &mut Map, dt: f64) {
    let mut spawned = Vec::new();

    for enemy in map.enemies.iter_mut() {
        if enemy.deletable {
            continue;
        }
        let tile = TilePos::containing(enemy.pos());
        let scale = if map.water.contains(&tile) {
            WATER_TIME_SCALE
        } else {
            1.0
        };
        spawned.extend(enemy.update(dt * scale, &mut map.objects, &mut map.projectiles));
    }

    map.projectiles.extend(spawned);
}
