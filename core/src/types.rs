//! Shared primitive types used across the engine.

/// A wall-clock timestamp in Unix milliseconds.
pub type Millis = i64;

/// The stable catalog key of an upgrade.
pub type UpgradeId = String;
