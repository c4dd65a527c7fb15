//! Economy and progression: click cursor, wallet and placement transactions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bulwark_core::constants::{
    COUNTER_SMOOTHNESS, CURSOR_BASE_COOLDOWN, CURSOR_BASE_DAMAGE, CURSOR_MIN_COOLDOWN,
};
use bulwark_core::smooth::SValue;

use crate::catalog::ObjMeta;

/// Bonus applied when the kill count reaches exactly `kills`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorUpgrade {
    pub kills: u32,
    pub damage: i32,
    /// Seconds removed from the click cooldown.
    pub cooldown: f64,
}

/// The player's click weapon.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub damage: i32,
    /// Seconds between clicks.
    pub cooldown: f64,
    /// Seconds until the next click lands.
    pub timeout: f64,
    pub kills: u32,
    /// Number of upgrades applied.
    pub level: u32,
    upgrades: Vec<CursorUpgrade>,
}

impl Cursor {
    /// `upgrades` must have strictly increasing kill thresholds.
    pub fn new(upgrades: Vec<CursorUpgrade>) -> Self {
        Self {
            damage: CURSOR_BASE_DAMAGE,
            cooldown: CURSOR_BASE_COOLDOWN,
            timeout: 0.0,
            kills: 0,
            level: 0,
            upgrades,
        }
    }

    /// Count a kill. Returns `true` if an upgrade threshold was hit.
    pub fn kill(&mut self) -> bool {
        self.kills += 1;

        let Some(upgrade) = self.upgrades.iter().find(|u| u.kills == self.kills).copied() else {
            return false;
        };
        self.damage += upgrade.damage;
        self.cooldown = (self.cooldown - upgrade.cooldown).max(CURSOR_MIN_COOLDOWN);
        self.level += 1;
        true
    }

    pub fn next_upgrade(&self) -> Option<&CursorUpgrade> {
        self.upgrades.iter().find(|u| u.kills > self.kills)
    }

    pub fn ready(&self) -> bool {
        self.timeout <= 0.0
    }

    /// Start the cooldown after a landed click.
    pub fn trigger(&mut self) {
        self.timeout = self.cooldown;
    }

    pub fn update(&mut self, dt: f64) {
        self.timeout = (self.timeout - dt).max(0.0);
    }

    /// Remaining cooldown as a fraction of the full cooldown.
    pub fn cooldown_fraction(&self) -> f64 {
        if self.cooldown > 0.0 {
            (self.timeout / self.cooldown).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Price in both currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub wood: u32,
    pub crystals: u32,
}

impl Cost {
    pub fn new(wood: u32, crystals: u32) -> Self {
        Self { wood, crystals }
    }
}

/// A purchasable template.
#[derive(Debug, Clone)]
pub struct ShopOffer {
    pub template: Arc<ObjMeta>,
    pub cost: Cost,
    /// Placements per purchase, `None` for unlimited.
    pub limit: Option<u32>,
}

/// Wallet and catalog of purchasable structures.
#[derive(Debug, Clone)]
pub struct Shop {
    pub wood: u32,
    pub crystals: u32,
    pub offers: Vec<ShopOffer>,
    pub wood_display: SValue,
    pub crystals_display: SValue,
}

impl Shop {
    pub fn new(offers: Vec<ShopOffer>, wood: u32, crystals: u32) -> Self {
        Self {
            wood,
            crystals,
            offers,
            wood_display: SValue::new(wood as f64, COUNTER_SMOOTHNESS, 0),
            crystals_display: SValue::new(crystals as f64, COUNTER_SMOOTHNESS, 0),
        }
    }

    pub fn add_wood(&mut self, amount: u32) {
        self.wood = self.wood.saturating_add(amount);
        self.wood_display.set(self.wood as f64);
    }

    pub fn add_crystals(&mut self, amount: u32) {
        self.crystals = self.crystals.saturating_add(amount);
        self.crystals_display.set(self.crystals as f64);
    }

    pub fn can_afford(&self, cost: Cost) -> bool {
        self.wood >= cost.wood && self.crystals >= cost.crystals
    }

    /// Deduct `cost` in full, or nothing if the wallet cannot cover it.
    pub fn charge(&mut self, cost: Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.wood -= cost.wood;
        self.crystals -= cost.crystals;
        self.wood_display.set(self.wood as f64);
        self.crystals_display.set(self.crystals as f64);
        true
    }

    /// Open a placement transaction for offer `index`.
    pub fn start_building(&self, index: usize) -> Option<Builder> {
        self.offers.get(index).map(|offer| Builder {
            template: Arc::clone(&offer.template),
            cost: offer.cost,
            remaining: offer.limit,
        })
    }

    pub fn update_displays(&mut self, dt: f64) {
        self.wood_display.update(dt);
        self.crystals_display.update(dt);
    }
}

/// In-progress placement of a purchased template.
///
/// Only answers "can afford" and "charge me"; tile validity is checked by
/// the map.
#[derive(Debug, Clone)]
pub struct Builder {
    pub template: Arc<ObjMeta>,
    pub cost: Cost,
    /// Placements left, `None` for unlimited.
    pub remaining: Option<u32>,
}

impl Builder {
    pub fn new(template: Arc<ObjMeta>, cost: Cost, remaining: Option<u32>) -> Self {
        Self {
            template,
            cost,
            remaining,
        }
    }

    pub fn placeable(&self, shop: &Shop) -> bool {
        shop.can_afford(self.cost) && self.remaining != Some(0)
    }

    /// Charge one placement. Returns `false` without charging if not placeable.
    pub fn placed(&mut self, shop: &mut Shop) -> bool {
        if !self.placeable(shop) || !shop.charge(self.cost) {
            return false;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        true
    }

    pub fn exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}
