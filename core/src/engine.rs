//! The progression engine — owns the authoritative game state.
//!
//! RULES:
//!   - Every state transition goes through the operations below.
//!   - Storage is reached only through the injected repository.
//!   - A rejected purchase is a strict no-op; nothing is clamped.
//!   - Derived rates are recomputed by full catalog scan on purchase,
//!     never by incremental deltas.

use crate::{
    catalog,
    clock::{Clock, OFFLINE_THRESHOLD_MS},
    command::PlayerCommand,
    error::GameResult,
    repository::GameRepository,
    state::{GameState, Upgrade, UpgradeKind},
    types::Millis,
};

/// Why a purchase did or did not go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    UnknownUpgrade,
    InsufficientTokens,
    LevelCapReached,
}

impl PurchaseOutcome {
    pub fn purchased(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased)
    }
}

pub struct GameEngine {
    state: GameState,
    /// Pristine catalog for fresh states and resets.
    catalog: Vec<Upgrade>,
    repository: Box<dyn GameRepository>,
    clock: Box<dyn Clock>,
}

impl GameEngine {
    /// Build the engine over the built-in catalog, from the persisted
    /// snapshot when one exists.
    pub fn initialize(
        repository: Box<dyn GameRepository>,
        clock: Box<dyn Clock>,
    ) -> GameResult<Self> {
        Self::with_catalog(repository, clock, catalog::default_upgrades())
    }

    /// Same, over a replacement catalog. The catalog seeds fresh states
    /// and resets; a loaded snapshot keeps the upgrades it was saved
    /// with. Offline accrual is settled here, against the timestamp of
    /// the last save, before `last_saved` moves to now.
    pub fn with_catalog(
        repository: Box<dyn GameRepository>,
        clock: Box<dyn Clock>,
        upgrades: Vec<Upgrade>,
    ) -> GameResult<Self> {
        catalog::validate(&upgrades)?;
        let now = clock.now_millis();
        let state = match repository.load()? {
            Some(mut loaded) => {
                apply_offline_accrual(&mut loaded, now);
                loaded.last_saved = now;
                loaded
            }
            None => {
                let mut fresh = GameState::new(upgrades.clone());
                fresh.last_saved = now;
                fresh
            }
        };
        Ok(Self {
            state,
            catalog: upgrades,
            repository,
            clock,
        })
    }

    /// Read-only snapshot for display.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Register one manual click. Always succeeds.
    pub fn click(&mut self) {
        let per_click = self.state.tokens_per_click;
        self.state.tokens += per_click;
        self.state.total_tokens_earned += per_click;
        self.state.clicks += 1;
    }

    /// One passive-income step. Ten ticks approximate one second, so a
    /// tick credits a tenth of the per-second rate. No-op while nothing
    /// produces.
    pub fn tick(&mut self) {
        if self.state.tokens_per_second <= 0.0 {
            return;
        }
        let delta = self.state.tokens_per_second / 10.0;
        self.state.tokens += delta;
        self.state.total_tokens_earned += delta;
    }

    /// Buy one level of `id`. Rejections leave the state untouched.
    pub fn buy_upgrade(&mut self, id: &str) -> PurchaseOutcome {
        let Some(upgrade) = self.state.upgrades.iter_mut().find(|u| u.id == id) else {
            return PurchaseOutcome::UnknownUpgrade;
        };
        if !upgrade.below_cap() {
            return PurchaseOutcome::LevelCapReached;
        }
        if self.state.tokens < upgrade.cost {
            return PurchaseOutcome::InsufficientTokens;
        }

        let price = upgrade.cost;
        let kind = upgrade.kind;
        upgrade.level += 1;
        upgrade.reprice();
        self.state.tokens -= price;

        // Full-scan recompute of the affected rate.
        match kind {
            UpgradeKind::Click => {
                self.state.tokens_per_click = self.state.derived_tokens_per_click();
            }
            UpgradeKind::Passive => {
                self.state.tokens_per_second = self.state.derived_tokens_per_second();
            }
        }
        PurchaseOutcome::Purchased
    }

    /// Write the snapshot. Runs on the autosave cadence and at
    /// shutdown; each write is an unconditional whole-state overwrite,
    /// so a failed write is made good by the next one.
    pub fn persist(&mut self) -> GameResult<()> {
        self.state.last_saved = self.clock.now_millis();
        self.repository.save(&self.state)
    }

    /// Drop all progress: purge the snapshot and return to catalog
    /// defaults. Irreversible — the caller confirms with the player
    /// first.
    pub fn reset(&mut self) -> GameResult<()> {
        self.repository.clear()?;
        let mut fresh = GameState::new(self.catalog.clone());
        fresh.last_saved = self.clock.now_millis();
        self.state = fresh;
        Ok(())
    }

    /// Apply a player command. Purchase rejections stay silent here;
    /// callers that need the outcome call `buy_upgrade` directly.
    pub fn apply(&mut self, command: &PlayerCommand) -> GameResult<()> {
        match command {
            PlayerCommand::Click => self.click(),
            PlayerCommand::BuyUpgrade { id } => {
                let outcome = self.buy_upgrade(id);
                if !outcome.purchased() {
                    log::debug!("Purchase of '{id}' rejected: {outcome:?}");
                }
            }
            PlayerCommand::Reset => self.reset()?,
        }
        Ok(())
    }
}

/// Settle passive income earned while the process was not running: a
/// linear extrapolation of the per-second rate from the last save to
/// now. Gaps of 5 s or less and non-producing states earn nothing.
/// A non-positive timestamp means the snapshot predates downtime
/// tracking; it is skipped rather than extrapolated from the epoch.
fn apply_offline_accrual(state: &mut GameState, now: Millis) {
    if state.last_saved <= 0 || state.tokens_per_second <= 0.0 {
        return;
    }
    let away_ms = now - state.last_saved;
    if away_ms <= OFFLINE_THRESHOLD_MS {
        return;
    }
    let earned = state.tokens_per_second * away_ms as f64 / 1000.0;
    state.tokens += earned;
    state.total_tokens_earned += earned;
    state.last_saved = now;
    log::info!(
        "Offline accrual: {earned:.1} tokens over {}s away",
        away_ms / 1000
    );
}
