//! Wall-clock access and the engine's timing policy.
//!
//! The engine never reads the system clock directly — "now" always
//! arrives through the [`Clock`] trait, so tests can pin time the same
//! way they pin a store.

use crate::types::Millis;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Milliseconds between passive-income ticks. Ten ticks per second
/// approximate continuous accrual.
pub const TICK_INTERVAL_MS: u64 = 100;

/// Milliseconds between snapshot autosaves.
pub const AUTOSAVE_INTERVAL_MS: u64 = 10_000;

/// Downtime at or below this threshold earns no offline accrual.
pub const OFFLINE_THRESHOLD_MS: Millis = 5_000;

/// Source of the current wall-clock time.
pub trait Clock: Send {
    fn now_millis(&self) -> Millis;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock pinned to a settable instant. Clones share the same instant,
/// so a test can keep a handle and move time while the engine owns the
/// boxed clock.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn at(now: Millis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}
