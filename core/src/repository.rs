//! The persistence seam between the engine and storage.
//!
//! The engine holds a boxed [`GameRepository`] handed to it at
//! construction; it never reaches for storage ambiently.

use crate::{error::GameResult, snapshot, state::GameState, store::SaveStore};
use std::sync::{Arc, Mutex};

/// Fixed key the snapshot lives under. Shared with the original browser
/// build so its saves load unchanged.
pub const SAVE_KEY: &str = "btc-clicker-save";

pub trait GameRepository: Send {
    /// Read the snapshot. `None` when absent or unreadable — a corrupt
    /// snapshot is discarded with a warning, never surfaced as an error.
    fn load(&self) -> GameResult<Option<GameState>>;

    /// Overwrite the snapshot. Single writer, last writer wins.
    fn save(&self, state: &GameState) -> GameResult<()>;

    /// Remove the snapshot.
    fn clear(&self) -> GameResult<()>;
}

/// Snapshot storage in the SQLite key-value store.
pub struct SqliteRepository {
    store: SaveStore,
}

impl SqliteRepository {
    pub fn new(store: SaveStore) -> Self {
        Self { store }
    }
}

impl GameRepository for SqliteRepository {
    fn load(&self) -> GameResult<Option<GameState>> {
        let Some(json) = self.store.get(SAVE_KEY)? else {
            return Ok(None);
        };
        match snapshot::decode(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                log::warn!("Discarding unreadable save data: {e}");
                self.store.remove(SAVE_KEY)?;
                Ok(None)
            }
        }
    }

    fn save(&self, state: &GameState) -> GameResult<()> {
        self.store.set(SAVE_KEY, &snapshot::encode(state)?)
    }

    fn clear(&self) -> GameResult<()> {
        self.store.remove(SAVE_KEY)
    }
}

/// Repository over a shared in-memory slot. Clones see the same slot,
/// so a test can rebuild an engine over the "stored" snapshot without a
/// database file. Saves still round-trip through JSON.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for MemoryRepository {
    fn load(&self) -> GameResult<Option<GameState>> {
        let mut slot = self.slot.lock().expect("snapshot slot");
        let Some(json) = slot.as_ref() else {
            return Ok(None);
        };
        match snapshot::decode(json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                log::warn!("Discarding unreadable save data: {e}");
                *slot = None;
                Ok(None)
            }
        }
    }

    fn save(&self, state: &GameState) -> GameResult<()> {
        let json = snapshot::encode(state)?;
        *self.slot.lock().expect("snapshot slot") = Some(json);
        Ok(())
    }

    fn clear(&self) -> GameResult<()> {
        *self.slot.lock().expect("snapshot slot") = None;
        Ok(())
    }
}
