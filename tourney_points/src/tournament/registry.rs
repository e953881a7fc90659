//! Tournament registry: announcement, status and the one-way finish transition.

use super::models::{Tournament, TournamentStatus};
use crate::db::{Store, TournamentRepository};
use crate::errors::{PointsError, PointsResult, require_id, require_non_negative};
use crate::sync::{Domains, TournamentsHeld};
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;

/// Tournament registry
#[derive(Clone)]
pub struct TournamentRegistry {
    store: Arc<dyn Store>,
    domains: Arc<Domains>,
}

impl TournamentRegistry {
    /// Create a new tournament registry
    pub fn new(store: Arc<dyn Store>, domains: Arc<Domains>) -> Self {
        Self { store, domains }
    }

    /// Announce an open tournament with an entry deposit
    ///
    /// # Errors
    ///
    /// * `PointsError::Conflict` - Tournament id already announced
    /// * `PointsError::InvalidArgument` - Negative deposit or empty id
    pub async fn announce(&self, tournament_id: &str, deposit: i64) -> PointsResult<Tournament> {
        let held = self.domains.tournaments().await;
        self.announce_held(&held, tournament_id, deposit).await
    }

    /// Current status
    ///
    /// # Errors
    ///
    /// * `PointsError::NotFound` - Unknown tournament
    pub async fn get_status(&self, tournament_id: &str) -> PointsResult<TournamentStatus> {
        Ok(self.get(tournament_id).await?.status())
    }

    /// Full tournament record
    pub async fn get(&self, tournament_id: &str) -> PointsResult<Tournament> {
        let held = self.domains.tournaments().await;
        self.find_held(&held, tournament_id).await
    }

    /// Record the winner; irreversible
    ///
    /// # Errors
    ///
    /// * `PointsError::Conflict` - Tournament absent or already finished
    pub async fn set_winner(&self, tournament_id: &str, winner_id: &str) -> PointsResult<Tournament> {
        let held = self.domains.tournaments().await;
        self.set_winner_held(&held, tournament_id, winner_id).await
    }

    pub async fn announce_held(
        &self,
        _held: &TournamentsHeld<'_>,
        tournament_id: &str,
        deposit: i64,
    ) -> PointsResult<Tournament> {
        require_id("tournamentId", tournament_id)?;

        if self.store.find_tournament(tournament_id).await?.is_some() {
            warn!("tournament {tournament_id} already announced");
            return Err(PointsError::Conflict(format!(
                "tournament {tournament_id} already exists"
            )));
        }
        require_non_negative("deposit", deposit)?;

        let tournament = Tournament::new(tournament_id, deposit);
        self.store.insert_tournament(&tournament).await?;
        debug!("announced tournament {tournament_id} with deposit {deposit}");

        Ok(tournament)
    }

    pub async fn find_held(
        &self,
        _held: &TournamentsHeld<'_>,
        tournament_id: &str,
    ) -> PointsResult<Tournament> {
        require_id("tournamentId", tournament_id)?;
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or_else(|| PointsError::NotFound(format!("tournament {tournament_id}")))
    }

    /// Tournament that still accepts joins and settlement
    ///
    /// # Errors
    ///
    /// * `PointsError::NotFound` - Unknown tournament
    /// * `PointsError::Conflict` - Tournament already finished
    pub async fn require_open_held(
        &self,
        held: &TournamentsHeld<'_>,
        tournament_id: &str,
    ) -> PointsResult<Tournament> {
        let tournament = self.find_held(held, tournament_id).await?;
        if !tournament.is_open() {
            return Err(PointsError::Conflict(format!(
                "tournament {tournament_id} already finished"
            )));
        }
        Ok(tournament)
    }

    pub async fn set_winner_held(
        &self,
        _held: &TournamentsHeld<'_>,
        tournament_id: &str,
        winner_id: &str,
    ) -> PointsResult<Tournament> {
        require_id("playerId", winner_id)?;

        let mut tournament = match self.store.find_tournament(tournament_id).await? {
            Some(t) if t.is_open() => t,
            Some(_) => {
                return Err(PointsError::Conflict(format!(
                    "tournament {tournament_id} already finished"
                )));
            }
            None => {
                return Err(PointsError::Conflict(format!(
                    "tournament {tournament_id} does not exist"
                )));
            }
        };

        let finished_at = Utc::now();
        self.store
            .set_winner(tournament_id, winner_id, finished_at)
            .await?;
        tournament.winner_id = Some(winner_id.to_string());
        tournament.finished_at = Some(finished_at);
        debug!("tournament {tournament_id} finished, winner {winner_id}");

        Ok(tournament)
    }
}
