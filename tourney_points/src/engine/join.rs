//! Join coordination: admitting a fee-paying group into an open tournament.

use crate::db::{JoinRepository, Store};
use crate::errors::{PointsError, PointsResult, require_id};
use crate::ledger::PlayerLedger;
use crate::sync::{AllHeld, Domains};
use crate::tournament::{JoinRecord, TournamentRegistry};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Admits leader + backer groups, debiting every member
#[derive(Clone)]
pub struct JoinCoordinator {
    store: Arc<dyn Store>,
    domains: Arc<Domains>,
    ledger: PlayerLedger,
    registry: TournamentRegistry,
}

impl JoinCoordinator {
    pub fn new(
        store: Arc<dyn Store>,
        domains: Arc<Domains>,
        ledger: PlayerLedger,
        registry: TournamentRegistry,
    ) -> Self {
        Self {
            store,
            domains,
            ledger,
            registry,
        }
    }

    /// Join `tournament_id` with `leader_id` paying alongside `backer_ids`
    ///
    /// Every partner pays `floor(deposit / group size)`. Balances are all
    /// checked before the first debit, so a failed check changes nothing.
    ///
    /// # Returns
    ///
    /// * `PointsResult<Vec<JoinRecord>>` - Inserted records, leader first
    ///
    /// # Errors
    ///
    /// * `PointsError::InvalidArgument` - Empty id, or a player listed twice
    /// * `PointsError::NotFound` - Unknown tournament or partner
    /// * `PointsError::Conflict` - Tournament finished, or leader already joined
    /// * `PointsError::InsufficientFunds` - Some partner cannot cover the fee
    /// * `PointsError::StoreUnavailable` - Store failed; earlier commits are kept
    pub async fn join(
        &self,
        tournament_id: &str,
        leader_id: &str,
        backer_ids: &[String],
    ) -> PointsResult<Vec<JoinRecord>> {
        let held = self.domains.all().await;
        self.join_held(&held, tournament_id, leader_id, backer_ids)
            .await
    }

    pub async fn join_held(
        &self,
        held: &AllHeld<'_>,
        tournament_id: &str,
        leader_id: &str,
        backer_ids: &[String],
    ) -> PointsResult<Vec<JoinRecord>> {
        require_id("tournamentId", tournament_id)?;
        let partners = partners(leader_id, backer_ids)?;

        let tournament = self
            .registry
            .require_open_held(&held.tournaments, tournament_id)
            .await?;

        let already_joined = self
            .store
            .leader_entries_for(leader_id)
            .await?
            .iter()
            .any(|record| record.tournament_id == tournament_id);
        if already_joined {
            warn!("{leader_id} tried to join {tournament_id} twice");
            return Err(PointsError::Conflict(format!(
                "player {leader_id} already joined tournament {tournament_id}"
            )));
        }

        // partners is never empty, so the division is defined
        let fee = tournament.deposit / partners.len() as i64;

        for partner in &partners {
            let view = self.ledger.balance_held(&held.players, partner).await?;
            if view.balance < fee {
                warn!(
                    "join of {tournament_id} by {leader_id} refused: {partner} holds {}, fee {fee}",
                    view.balance
                );
                return Err(PointsError::InsufficientFunds {
                    player_id: partner.to_string(),
                    available: view.balance,
                    required: fee,
                });
            }
        }

        let mut records = Vec::with_capacity(partners.len());
        for partner in &partners {
            self.ledger.debit_held(&held.players, partner, fee).await?;

            let record = if *partner == leader_id {
                JoinRecord::leader(tournament_id, partner, fee)
            } else {
                JoinRecord::backer(tournament_id, partner, fee, leader_id)
            };
            self.store.insert_join(&record).await?;
            debug!("{partner} escrowed {fee} in {tournament_id} behind {leader_id}");
            records.push(record);
        }

        info!(
            "{leader_id} joined {tournament_id} with {} backer(s), fee {fee} each",
            partners.len() - 1
        );

        Ok(records)
    }
}

/// Leader followed by backers, order preserved, every id distinct
fn partners<'a>(leader_id: &'a str, backer_ids: &'a [String]) -> PointsResult<Vec<&'a str>> {
    require_id("playerId", leader_id)?;

    let mut seen = HashSet::with_capacity(backer_ids.len() + 1);
    let mut partners = Vec::with_capacity(backer_ids.len() + 1);
    for id in std::iter::once(leader_id).chain(backer_ids.iter().map(String::as_str)) {
        require_id("backerId", id)?;
        if !seen.insert(id) {
            return Err(PointsError::InvalidArgument(format!(
                "player {id} appears more than once in the join group"
            )));
        }
        partners.push(id);
    }

    Ok(partners)
}
