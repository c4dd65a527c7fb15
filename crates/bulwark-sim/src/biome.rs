//! Biomes: weighted object tables used to fill empty tiles.

use std::sync::Arc;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::ObjMeta;

#[derive(Debug, Clone)]
pub struct Biome {
    entries: Vec<Arc<ObjMeta>>,
    weights: Option<WeightedIndex<f64>>,
    /// Probability that a roll yields nothing.
    pub empty_chance: f64,
    /// Population chance applied to free tiles after each cleared wave.
    pub regrow_chance: f64,
}

impl Biome {
    /// Build a biome from `(template, weight)` pairs.
    ///
    /// Returns `None` when the table is non-empty but its weights cannot form
    /// a distribution (negative, NaN, or all zero).
    pub fn new(
        entries: Vec<(Arc<ObjMeta>, f64)>,
        empty_chance: f64,
        regrow_chance: f64,
    ) -> Option<Self> {
        let weights = if entries.is_empty() {
            None
        } else {
            Some(WeightedIndex::new(entries.iter().map(|(_, w)| *w)).ok()?)
        };
        Some(Self {
            entries: entries.into_iter().map(|(meta, _)| meta).collect(),
            weights,
            empty_chance: empty_chance.clamp(0.0, 1.0),
            regrow_chance: regrow_chance.clamp(0.0, 1.0),
        })
    }

    /// A biome that never yields anything.
    pub fn barren() -> Self {
        Self {
            entries: Vec::new(),
            weights: None,
            empty_chance: 1.0,
            regrow_chance: 0.0,
        }
    }

    /// Roll a template, or `None` for an empty roll.
    pub fn random_template(&self, rng: &mut ChaCha8Rng) -> Option<Arc<ObjMeta>> {
        if rng.gen_bool(self.empty_chance) {
            return None;
        }
        let weights = self.weights.as_ref()?;
        self.entries.get(weights.sample(rng)).cloned()
    }
}
