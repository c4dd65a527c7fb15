//! Wave system: intermission countdown, spawning and wave clears.

use glam::DVec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::constants::{SPAWN_INTERVAL_MAX, SPAWN_INTERVAL_MIN, WAVE_RESET_TIMEOUT};
use bulwark_core::enums::{EnemyKind, WavePhase};
use bulwark_core::events::GameEvent;

use crate::catalog::Catalog;
use crate::map::Map;
use crate::wave::Wave;

/// Wave state machine: intermission → active → intermission.
#[derive(Debug, Clone)]
pub struct WaveDirector {
    pub wave: Wave,
    pub phase: WavePhase,
    /// Enemies still to spawn this wave, popped from the back.
    pub spawn_list: Vec<EnemyKind>,
    pub spawn_timer: f64,
}

impl WaveDirector {
    pub fn new(wave: Wave, first_timeout: f64) -> Self {
        Self {
            wave,
            phase: WavePhase::Intermission {
                timeout: first_timeout,
            },
            spawn_list: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    /// End the current intermission at the next update.
    pub fn skip_intermission(&mut self) -> bool {
        match &mut self.phase {
            WavePhase::Intermission { timeout } => {
                *timeout = 0.0;
                true
            }
            WavePhase::Active => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == WavePhase::Active
    }

    fn start_wave(&mut self, rng: &mut ChaCha8Rng) -> GameEvent {
        self.wave.next_wave(rng);
        self.spawn_list = self.wave.get_spawn_list(rng);
        self.spawn_timer = 0.0;
        self.phase = WavePhase::Active;

        let enemies = self.spawn_list.len() as u32;
        log::info!("Wave {} started with {enemies} enemies", self.wave.number);
        GameEvent::WaveStarted {
            wave: self.wave.number,
            enemies,
        }
    }
}

/// Advance the wave state machine by `dt`.
pub fn run(
    director: &mut WaveDirector,
    map: &mut Map,
    catalog: &Catalog,
    castle: DVec2,
    dt: f64,
    rng: &mut ChaCha8Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match director.phase {
        WavePhase::Intermission { timeout } => {
            let timeout = timeout - dt;
            if timeout <= 0.0 {
                events.push(director.start_wave(rng));
            } else {
                director.phase = WavePhase::Intermission { timeout };
            }
        }
        WavePhase::Active => {
            director.spawn_timer -= dt;
            if director.spawn_timer <= 0.0 {
                if let Some(kind) = director.spawn_list.pop() {
                    if let Some(tile) = map.random_spawn_tile(rng) {
                        map.add_enemy(catalog.enemy(kind, tile.center(), castle));
                    }
                    director.spawn_timer = rng.gen_range(SPAWN_INTERVAL_MIN..SPAWN_INTERVAL_MAX);
                }
            }

            if director.spawn_list.is_empty() && map.enemies.is_empty() {
                let wave = director.wave.number;
                log::info!("Wave {wave} cleared");
                events.push(GameEvent::WaveCleared { wave });

                director.phase = WavePhase::Intermission {
                    timeout: WAVE_RESET_TIMEOUT,
                };
                let regrow = map.biome.regrow_chance;
                map.populate_empty(regrow, rng);
            }
        }
    }

    events
}
