//! Player ledger data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player ID type
pub type PlayerId = String;

/// Player account model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Create a player record holding an opening balance
    pub fn new(player_id: impl Into<PlayerId>, balance: i64) -> Self {
        let now = Utc::now();
        Self {
            player_id: player_id.into(),
            balance,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Balance snapshot returned to callers after a ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub player_id: PlayerId,
    pub balance: i64,
}

impl From<&Player> for BalanceView {
    fn from(player: &Player) -> Self {
        Self {
            player_id: player.player_id.clone(),
            balance: player.balance,
        }
    }
}
