use crate::types::UpgradeId;
use serde::{Deserialize, Serialize};

/// All player-issued commands the engine accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// One manual tap on the coin.
    Click,

    /// Buy one level of the named upgrade. Rejected silently when the
    /// id is unknown, tokens are short, or the level cap is reached.
    BuyUpgrade { id: UpgradeId },

    /// Drop all progress and purge the snapshot. The presentation layer
    /// confirms with the player before sending this.
    Reset,
}
