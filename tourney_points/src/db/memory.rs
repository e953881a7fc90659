//! In-process [`Store`] backed by hash maps.
//!
//! Used by the test suites and by the server's `memory` backend. Writes can be
//! made to fail after a budget is exhausted, which is how persistence failures
//! in the middle of a commit are reproduced.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::errors::{StoreError, StoreResult};
use super::repository::{JoinRepository, PlayerRepository, Store, TournamentRepository};
use crate::ledger::{Player, PlayerId};
use crate::tournament::{JoinRecord, Tournament, TournamentId};

#[derive(Default)]
struct Tables {
    players: HashMap<PlayerId, Player>,
    tournaments: HashMap<TournamentId, Tournament>,
    joinings: Vec<JoinRecord>,
    /// Remaining successful writes before every write fails; `None` means unlimited
    write_budget: Option<usize>,
}

impl Tables {
    fn charge_write(&mut self) -> StoreResult<()> {
        match self.write_budget.as_mut() {
            Some(0) => Err(StoreError::Unavailable(
                "write budget exhausted".to_string(),
            )),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Hash-map store
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the next `writes` writes succeed, then fail every later write
    pub fn fail_writes_after(&self, writes: usize) {
        self.lock().write_budget = Some(writes);
    }

    /// Remove any write failure injection
    pub fn heal(&self) {
        self.lock().write_budget = None;
    }

    /// Snapshot of every player
    pub fn players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.lock().players.values().cloned().collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        players
    }

    /// Snapshot of every join record, in insertion order
    pub fn joinings(&self) -> Vec<JoinRecord> {
        self.lock().joinings.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn find_player(&self, player_id: &str) -> StoreResult<Option<Player>> {
        Ok(self.lock().players.get(player_id).cloned())
    }

    async fn insert_player(&self, player: &Player) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.players.contains_key(&player.player_id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate player key {}",
                player.player_id
            )));
        }
        tables.charge_write()?;
        tables
            .players
            .insert(player.player_id.clone(), player.clone());
        Ok(())
    }

    async fn update_balance(&self, player_id: &str, balance: i64) -> StoreResult<()> {
        let mut tables = self.lock();
        tables.charge_write()?;
        if let Some(player) = tables.players.get_mut(player_id) {
            player.balance = balance;
            player.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn find_tournament(&self, tournament_id: &str) -> StoreResult<Option<Tournament>> {
        Ok(self.lock().tournaments.get(tournament_id).cloned())
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.tournaments.contains_key(&tournament.tournament_id) {
            return Err(StoreError::Unavailable(format!(
                "duplicate tournament key {}",
                tournament.tournament_id
            )));
        }
        tables.charge_write()?;
        tables
            .tournaments
            .insert(tournament.tournament_id.clone(), tournament.clone());
        Ok(())
    }

    async fn set_winner(
        &self,
        tournament_id: &str,
        winner_id: &str,
        finished_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.lock();
        tables.charge_write()?;
        if let Some(tournament) = tables.tournaments.get_mut(tournament_id) {
            tournament.winner_id = Some(winner_id.to_string());
            tournament.finished_at = Some(finished_at);
        }
        Ok(())
    }
}

#[async_trait]
impl JoinRepository for MemoryStore {
    async fn insert_join(&self, record: &JoinRecord) -> StoreResult<()> {
        let mut tables = self.lock();
        tables.charge_write()?;
        tables.joinings.push(record.clone());
        Ok(())
    }

    async fn delete_join(&self, tournament_id: &str, player_id: &str) -> StoreResult<u64> {
        let mut tables = self.lock();
        tables.charge_write()?;
        let before = tables.joinings.len();
        tables
            .joinings
            .retain(|r| !(r.tournament_id == tournament_id && r.player_id == player_id));
        Ok((before - tables.joinings.len()) as u64)
    }

    async fn joins_for_tournament(&self, tournament_id: &str) -> StoreResult<Vec<JoinRecord>> {
        Ok(self
            .lock()
            .joinings
            .iter()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn leader_entries(&self) -> StoreResult<Vec<JoinRecord>> {
        Ok(self
            .lock()
            .joinings
            .iter()
            .filter(|r| r.is_leader())
            .cloned()
            .collect())
    }

    async fn leader_entries_for(&self, leader_id: &str) -> StoreResult<Vec<JoinRecord>> {
        Ok(self
            .lock()
            .joinings
            .iter()
            .filter(|r| r.is_leader() && r.player_id == leader_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn reset(&self) -> StoreResult<()> {
        let mut tables = self.lock();
        tables.charge_write()?;
        tables.players.clear();
        tables.tournaments.clear();
        tables.joinings.clear();
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        match self.lock().write_budget {
            Some(0) => Err(StoreError::Unavailable(
                "write budget exhausted".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
