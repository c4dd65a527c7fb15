//! Cleanup system: prunes expired projectiles and dead enemies.

use crate::enemy::Enemy;
use crate::map::Map;

/// Remove deletable projectiles and enemies in one pass each.
///
/// Returns the removed enemies so the engine can credit kills.
pub fn run(map: &mut Map) -> Vec<Enemy> {
    map.projectiles.retain(|p| !p.deletable);

    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
        map.enemies.drain(..).partition(|enemy| enemy.deletable);
    map.enemies = alive;
    dead
}
