//! Wave schedules: per-enemy escalation and shuffled spawn lists.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::enums::EnemyKind;

/// Spawn schedule of one enemy type within a preset.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveEnemy {
    pub kind: EnemyKind,
    /// First wave this enemy appears in.
    pub starting_wave: u32,
    /// Count spawned per wave once active.
    pub amount: u32,
    pub max_amount: u32,
    /// Inclusive range added to `amount` on every wave past the starting one.
    pub increase: (u32, u32),
    /// Waves seen so far.
    pub wave: u32,
}

impl WaveEnemy {
    pub fn new(
        kind: EnemyKind,
        starting_wave: u32,
        amount: u32,
        max_amount: u32,
        increase: (u32, u32),
    ) -> Self {
        Self {
            kind,
            starting_wave,
            amount: amount.min(max_amount),
            max_amount,
            increase: (increase.0.min(increase.1), increase.0.max(increase.1)),
            wave: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.wave >= self.starting_wave
    }

    /// Advance to the next wave, growing `amount` once past the starting wave.
    pub fn next_wave(&mut self, rng: &mut ChaCha8Rng) {
        self.wave += 1;
        if self.wave > self.starting_wave {
            let grow = rng.gen_range(self.increase.0..=self.increase.1);
            self.amount = self.amount.saturating_add(grow).min(self.max_amount);
        }
    }
}

/// Aggregated schedule of a preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wave {
    /// Current wave number, 0 before the first wave starts.
    pub number: u32,
    pub enemies: Vec<WaveEnemy>,
}

impl Wave {
    pub fn new(enemies: Vec<WaveEnemy>) -> Self {
        Self { number: 0, enemies }
    }

    pub fn next_wave(&mut self, rng: &mut ChaCha8Rng) {
        self.number += 1;
        for enemy in &mut self.enemies {
            enemy.next_wave(rng);
        }
    }

    /// Every active enemy `amount` times, shuffled across types.
    pub fn get_spawn_list(&self, rng: &mut ChaCha8Rng) -> Vec<EnemyKind> {
        let mut list: Vec<EnemyKind> = self
            .enemies
            .iter()
            .filter(|e| e.is_active())
            .flat_map(|e| std::iter::repeat(e.kind).take(e.amount as usize))
            .collect();
        list.shuffle(rng);
        list
    }
}
