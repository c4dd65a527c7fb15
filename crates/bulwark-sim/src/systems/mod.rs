//! Per-frame systems run by the engine in a fixed order.
//!
//! Systems are free functions over the map and the engine's state. Objects
//! update before projectiles, projectiles before enemies, and deletion is
//! deferred to the end of each system's pass.

pub mod cleanup;
pub mod enemies;
pub mod objects;
pub mod projectiles;
pub mod snapshot;
pub mod waves;
