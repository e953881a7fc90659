//! Tournament and join-record data models.

use crate::ledger::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tournament ID type
pub type TournamentId = String;

/// Tournament status, derived from winner presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Accepting joins, not yet settled
    Open,
    /// Winner recorded; no further joins or settlements
    Finished,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Open => write!(f, "open"),
            TournamentStatus::Finished => write!(f, "finished"),
        }
    }
}

/// Tournament model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub tournament_id: TournamentId,
    /// Entry deposit charged to each join group
    pub deposit: i64,
    pub winner_id: Option<PlayerId>,
    pub announced_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create an open tournament
    pub fn new(tournament_id: impl Into<TournamentId>, deposit: i64) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            deposit,
            winner_id: None,
            announced_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> TournamentStatus {
        match self.winner_id {
            Some(_) => TournamentStatus::Finished,
            None => TournamentStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status() == TournamentStatus::Open
    }
}

/// Role of a join record inside its group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Entry {
    /// Fee-paying anchor of the group
    Leader,
    /// Shares the leader's fee and prize
    Backer { leader_id: PlayerId },
}

/// One participant's stake in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRecord {
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    /// Points escrowed by this participant
    pub contributed: i64,
    pub entry: Entry,
    pub joined_at: DateTime<Utc>,
}

impl JoinRecord {
    /// Leader entry: the player anchors its own group
    pub fn leader(tournament_id: &str, player_id: &str, contributed: i64) -> Self {
        Self {
            tournament_id: tournament_id.to_string(),
            player_id: player_id.to_string(),
            contributed,
            entry: Entry::Leader,
            joined_at: Utc::now(),
        }
    }

    /// Backer entry pointing at `leader_id`
    pub fn backer(tournament_id: &str, player_id: &str, contributed: i64, leader_id: &str) -> Self {
        Self {
            tournament_id: tournament_id.to_string(),
            player_id: player_id.to_string(),
            contributed,
            entry: Entry::Backer {
                leader_id: leader_id.to_string(),
            },
            joined_at: Utc::now(),
        }
    }

    /// Rebuild a record from its flat storage form, where a leader points at itself
    pub fn from_columns(
        tournament_id: String,
        player_id: String,
        contributed: i64,
        contribute_to: String,
        joined_at: DateTime<Utc>,
    ) -> Self {
        let entry = if contribute_to == player_id {
            Entry::Leader
        } else {
            Entry::Backer {
                leader_id: contribute_to,
            }
        };
        Self {
            tournament_id,
            player_id,
            contributed,
            entry,
            joined_at,
        }
    }

    /// Id of the group's leader (the player itself for a leader entry)
    pub fn leader_id(&self) -> &str {
        match &self.entry {
            Entry::Leader => &self.player_id,
            Entry::Backer { leader_id } => leader_id,
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self.entry, Entry::Leader)
    }
}

/// Outcome of a settled tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub tournament_id: TournamentId,
    pub winner_id: PlayerId,
    /// `deposit × number of join groups`
    pub prize: i64,
    /// Share credited to each acquirer
    pub profit: i64,
    /// Leader first, then backers in join order
    pub acquirers: Vec<PlayerId>,
}
