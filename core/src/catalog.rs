//! The upgrade catalog — the fixed set of purchasable upgrades.
//!
//! The built-in catalog is the shipped game. A replacement catalog can
//! be loaded from a JSON file for balancing experiments; loaded
//! catalogs go through the same validation the purchase path relies on.

use crate::{
    error::{GameError, GameResult},
    state::{Upgrade, UpgradeKind},
};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    upgrades: Vec<Upgrade>,
}

/// The built-in catalog. `click_power` starts owned at level 1; every
/// passive upgrade starts at level 0.
pub fn default_upgrades() -> Vec<Upgrade> {
    vec![
        Upgrade {
            id: "click_power".into(),
            name: "Better Mouse".into(),
            description: "Earn more tokens per click".into(),
            base_cost: 10.0,
            cost: 10.0,
            level: 1,
            effect: 1.0,
            kind: UpgradeKind::Click,
            max_level: None,
        },
        Upgrade {
            id: "basic_miner".into(),
            name: "Basic Miner".into(),
            description: "A simple mining rig that earns tokens automatically".into(),
            base_cost: 15.0,
            cost: 15.0,
            level: 0,
            effect: 0.1,
            kind: UpgradeKind::Passive,
            max_level: None,
        },
        Upgrade {
            id: "gpu_miner".into(),
            name: "GPU Miner".into(),
            description: "A more powerful miner with multiple GPUs".into(),
            base_cost: 100.0,
            cost: 100.0,
            level: 0,
            effect: 1.0,
            kind: UpgradeKind::Passive,
            max_level: None,
        },
        Upgrade {
            id: "mining_farm".into(),
            name: "Mining Farm".into(),
            description: "A large setup of mining equipment".into(),
            base_cost: 1_100.0,
            cost: 1_100.0,
            level: 0,
            effect: 8.0,
            kind: UpgradeKind::Passive,
            max_level: None,
        },
        Upgrade {
            id: "quantum_miner".into(),
            name: "Quantum Miner".into(),
            description: "Utilizes quantum computing for extremely efficient mining".into(),
            base_cost: 12_000.0,
            cost: 12_000.0,
            level: 0,
            effect: 50.0,
            kind: UpgradeKind::Passive,
            max_level: None,
        },
    ]
}

/// Load a replacement catalog from a JSON file shaped as
/// `{ "upgrades": [ ... ] }`, entries in the snapshot upgrade layout.
pub fn load_catalog_file(path: &str) -> GameResult<Vec<Upgrade>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let file: CatalogFile = serde_json::from_str(&content)?;
    validate(&file.upgrades)?;
    Ok(file.upgrades)
}

/// Reject catalogs the purchase path cannot price: duplicate ids,
/// non-positive base costs, or non-positive effects.
pub fn validate(upgrades: &[Upgrade]) -> GameResult<()> {
    let mut seen = HashSet::new();
    for u in upgrades {
        if !seen.insert(u.id.as_str()) {
            return Err(GameError::InvalidCatalog(format!(
                "duplicate upgrade id '{}'",
                u.id
            )));
        }
        if u.base_cost <= 0.0 {
            return Err(GameError::InvalidCatalog(format!(
                "upgrade '{}' has non-positive baseCost",
                u.id
            )));
        }
        if u.effect <= 0.0 {
            return Err(GameError::InvalidCatalog(format!(
                "upgrade '{}' has non-positive effect",
                u.id
            )));
        }
    }
    Ok(())
}
