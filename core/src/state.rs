//! Game state — the single mutable aggregate the engine owns.
//!
//! RULES:
//!   - `upgrades` is a fixed catalog: purchases mutate `level` and
//!     `cost` in place, nothing is ever added or removed at runtime.
//!   - The derived rates are recomputed by a full scan of the catalog
//!     on every purchase, never by incremental deltas.
//!   - Serialized field names are the original camelCase save layout;
//!     saves written by the browser build load unchanged.

use crate::{
    catalog,
    types::{Millis, UpgradeId},
};
use serde::{Deserialize, Serialize};

/// Which derived rate an upgrade feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Click,
    Passive,
}

/// A catalog entry. `id`, `name`, `description`, `base_cost`, `effect`,
/// `kind`, and `max_level` are fixed at definition; `level` and `cost`
/// advance with purchases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    pub id: UpgradeId,
    pub name: String,
    pub description: String,
    pub base_cost: f64,
    pub cost: f64,
    pub level: u32,
    pub effect: f64,
    #[serde(rename = "type")]
    pub kind: UpgradeKind,
    /// Upper purchase bound. `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
}

impl Upgrade {
    /// Re-derive `cost` from the 15%-compounding curve at the current
    /// level: `floor(base_cost * 1.15^level)`.
    pub fn reprice(&mut self) {
        self.cost = (self.base_cost * 1.15_f64.powi(self.level as i32)).floor();
    }

    /// Whether another level may still be bought.
    pub fn below_cap(&self) -> bool {
        self.max_level.map_or(true, |cap| self.level < cap)
    }
}

/// The authoritative aggregate. One instance per save profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub tokens: f64,
    pub tokens_per_click: f64,
    pub tokens_per_second: f64,
    pub total_tokens_earned: f64,
    pub clicks: u64,
    /// Set on load and on every snapshot write; offline accrual is
    /// computed against it.
    pub last_saved: Millis,
    pub upgrades: Vec<Upgrade>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(catalog::default_upgrades())
    }
}

impl GameState {
    /// Fresh state over the given catalog.
    pub fn new(upgrades: Vec<Upgrade>) -> Self {
        Self {
            tokens: 0.0,
            tokens_per_click: 1.0,
            tokens_per_second: 0.0,
            total_tokens_earned: 0.0,
            clicks: 0,
            last_saved: 0,
            upgrades,
        }
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    /// Per-click rate derived from scratch: a base of 1 plus every
    /// click upgrade's `effect × level`.
    pub fn derived_tokens_per_click(&self) -> f64 {
        1.0 + self
            .upgrades
            .iter()
            .filter(|u| u.kind == UpgradeKind::Click)
            .map(|u| u.effect * u.level as f64)
            .sum::<f64>()
    }

    /// Per-second rate derived from scratch. No base — with no passive
    /// levels owned, nothing accrues.
    pub fn derived_tokens_per_second(&self) -> f64 {
        self.upgrades
            .iter()
            .filter(|u| u.kind == UpgradeKind::Passive)
            .map(|u| u.effect * u.level as f64)
            .sum()
    }
}
