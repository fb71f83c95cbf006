//! Snapshot serialization — the whole game state to/from JSON.
//!
//! A snapshot is one JSON object in the original camelCase save layout,
//! overwritten in full on every autosave. Loading is lenient: unknown
//! fields are ignored and missing fields fall back to catalog defaults,
//! so older and newer saves both round-trip.

use crate::{error::GameResult, state::GameState};

pub fn encode(state: &GameState) -> GameResult<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode(json: &str) -> GameResult<GameState> {
    Ok(serde_json::from_str(json)?)
}
