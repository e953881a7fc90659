//! Settlement: winner selection, prize distribution and eviction of every
//! join record of the settled tournament.

use crate::db::{JoinRepository, Store, TournamentRepository};
use crate::errors::{PointsError, PointsResult, require_id};
use crate::ledger::{PlayerId, PlayerLedger};
use crate::selector::RandomSelector;
use crate::sync::{AllHeld, Domains};
use crate::tournament::{JoinRecord, SettlementReport, TournamentId, TournamentRegistry};
use log::{debug, info, warn};
use std::sync::Arc;

/// Settles tournaments exactly once
#[derive(Clone)]
pub struct SettlementEngine {
    store: Arc<dyn Store>,
    domains: Arc<Domains>,
    ledger: PlayerLedger,
    registry: TournamentRegistry,
    selector: Arc<RandomSelector>,
}

impl SettlementEngine {
    pub fn new(
        store: Arc<dyn Store>,
        domains: Arc<Domains>,
        ledger: PlayerLedger,
        registry: TournamentRegistry,
        selector: Arc<RandomSelector>,
    ) -> Self {
        Self {
            store,
            domains,
            ledger,
            registry,
            selector,
        }
    }

    /// Settle a tournament
    ///
    /// A missing `tournament_id` is chosen at random among tournaments with
    /// leader entries (restricted to those `winner_id` leads, when given).
    /// A missing `winner_id` is chosen at random among the tournament's
    /// leaders. The winning group splits `deposit × group count` evenly.
    ///
    /// # Errors
    ///
    /// * `PointsError::EmptyCandidateSet` - Nothing to choose from
    /// * `PointsError::NotFound` - Unknown tournament, or winner leads no group in it
    /// * `PointsError::Conflict` - Tournament already finished
    /// * `PointsError::InvalidArgument` - Empty id, or prize overflow
    /// * `PointsError::StoreUnavailable` - Store failed; earlier commits are kept
    pub async fn result(
        &self,
        tournament_id: Option<&str>,
        winner_id: Option<&str>,
    ) -> PointsResult<SettlementReport> {
        let held = self.domains.all().await;
        self.result_held(&held, tournament_id, winner_id).await
    }

    pub async fn result_held(
        &self,
        held: &AllHeld<'_>,
        tournament_id: Option<&str>,
        winner_id: Option<&str>,
    ) -> PointsResult<SettlementReport> {
        if let Some(id) = tournament_id {
            require_id("tournamentId", id)?;
        }
        if let Some(id) = winner_id {
            require_id("playerId", id)?;
        }

        let tournament_id = match tournament_id {
            Some(id) => id.to_string(),
            None => self.pick_tournament(winner_id).await?,
        };
        let tournament = self
            .registry
            .require_open_held(&held.tournaments, &tournament_id)
            .await?;

        let records = self.store.joins_for_tournament(&tournament_id).await?;
        let leaders = sorted_unique(records.iter().filter(|r| r.is_leader()).map(|r| &r.player_id));

        let winner_id = match winner_id {
            Some(id) => id.to_string(),
            None => self
                .selector
                .choose(&format!("leaders of tournament {tournament_id}"), &leaders)?
                .clone(),
        };

        let acquirers = acquirers(&records, &winner_id);
        if acquirers.is_empty() {
            warn!("settlement of {tournament_id} names {winner_id}, who leads no group there");
            return Err(PointsError::NotFound(format!(
                "player {winner_id} has no join group in tournament {tournament_id}"
            )));
        }

        let prize = tournament
            .deposit
            .checked_mul(leaders.len() as i64)
            .ok_or_else(|| {
                PointsError::InvalidArgument(format!(
                    "prize of tournament {tournament_id} overflows"
                ))
            })?;
        let profit = prize / acquirers.len() as i64;

        self.registry
            .set_winner_held(&held.tournaments, &tournament_id, &winner_id)
            .await?;

        for acquirer in &acquirers {
            self.ledger
                .credit_held(&held.players, acquirer, profit)
                .await?;
            self.store.delete_join(&tournament_id, acquirer).await?;
            debug!("{acquirer} received {profit} from {tournament_id}");
        }

        let losers = sorted_unique(
            self.store
                .joins_for_tournament(&tournament_id)
                .await?
                .iter()
                .map(|r| &r.player_id),
        );
        for loser in &losers {
            self.store.delete_join(&tournament_id, loser).await?;
        }
        if !losers.is_empty() {
            debug!("{} entrant(s) forfeited {tournament_id}", losers.len());
        }

        info!(
            "settled {tournament_id}: winner {winner_id}, prize {prize} split {} way(s)",
            acquirers.len()
        );

        Ok(SettlementReport {
            tournament_id,
            winner_id,
            prize,
            profit,
            acquirers,
        })
    }

    async fn pick_tournament(&self, winner_id: Option<&str>) -> PointsResult<TournamentId> {
        let (entries, what) = match winner_id {
            Some(leader) => (
                self.store.leader_entries_for(leader).await?,
                format!("tournaments led by {leader}"),
            ),
            None => (
                self.store.leader_entries().await?,
                "open tournaments with entrants".to_string(),
            ),
        };
        let mut candidates = Vec::new();
        for id in sorted_unique(entries.iter().map(|r| &r.tournament_id)) {
            // a failed settlement can leave records behind in a finished tournament
            let tournament = self.store.find_tournament(&id).await?;
            if tournament.is_some_and(|t| t.is_open()) {
                candidates.push(id);
            }
        }
        Ok(self.selector.choose(&what, &candidates)?.clone())
    }
}

/// The winner's group: its leader entry first, then backers in join order
fn acquirers(records: &[JoinRecord], winner_id: &str) -> Vec<PlayerId> {
    let mut group: Vec<&JoinRecord> = records
        .iter()
        .filter(|r| r.leader_id() == winner_id)
        .collect();
    group.sort_by_key(|r| !r.is_leader());
    group.into_iter().map(|r| r.player_id.clone()).collect()
}

fn sorted_unique<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.cloned().collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::engine::join::JoinCoordinator;
    use crate::errors::ErrorKind;
    use crate::tournament::TournamentStatus;

    struct Fixture {
        store: Arc<MemoryStore>,
        ledger: PlayerLedger,
        registry: TournamentRegistry,
        joins: JoinCoordinator,
        settlement: SettlementEngine,
    }

    fn fixture(seed: u64) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let domains = Arc::new(Domains::new());
        let ledger = PlayerLedger::new(store.clone(), domains.clone());
        let registry = TournamentRegistry::new(store.clone(), domains.clone());
        let joins = JoinCoordinator::new(
            store.clone(),
            domains.clone(),
            ledger.clone(),
            registry.clone(),
        );
        let settlement = SettlementEngine::new(
            store.clone(),
            domains,
            ledger.clone(),
            registry.clone(),
            Arc::new(RandomSelector::seeded(seed)),
        );
        Fixture {
            store,
            ledger,
            registry,
            joins,
            settlement,
        }
    }

    async fn balance(f: &Fixture, player: &str) -> i64 {
        f.ledger.get_balance(player).await.unwrap().balance
    }

    #[tokio::test]
    async fn test_group_shares_prize_and_losers_forfeit() {
        let f = fixture(1);
        for player in ["A", "B", "C", "D"] {
            f.ledger.credit(player, 1000).await.unwrap();
        }
        f.registry.announce("T1", 300).await.unwrap();
        f.joins
            .join("T1", "A", &["B".to_string(), "C".to_string()])
            .await
            .unwrap();
        f.joins.join("T1", "D", &[]).await.unwrap();

        let report = f.settlement.result(Some("T1"), Some("A")).await.unwrap();
        assert_eq!(report.prize, 600);
        assert_eq!(report.profit, 200);
        assert_eq!(report.acquirers, vec!["A", "B", "C"]);

        for player in ["A", "B", "C"] {
            assert_eq!(balance(&f, player).await, 1100);
        }
        assert_eq!(balance(&f, "D").await, 700);
        assert!(f.store.joinings().is_empty());
        assert_eq!(
            f.registry.get_status("T1").await.unwrap(),
            TournamentStatus::Finished
        );
    }

    #[tokio::test]
    async fn test_settle_once() {
        let f = fixture(1);
        f.ledger.credit("A", 100).await.unwrap();
        f.registry.announce("T1", 100).await.unwrap();
        f.joins.join("T1", "A", &[]).await.unwrap();

        f.settlement.result(Some("T1"), Some("A")).await.unwrap();
        let err = f
            .settlement
            .result(Some("T1"), Some("A"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(balance(&f, "A").await, 100);
    }

    #[tokio::test]
    async fn test_winner_without_group_not_found() {
        let f = fixture(1);
        f.ledger.credit("A", 100).await.unwrap();
        f.registry.announce("T1", 100).await.unwrap();
        f.joins.join("T1", "A", &[]).await.unwrap();

        let err = f
            .settlement
            .result(Some("T1"), Some("Z"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            f.registry.get_status("T1").await.unwrap(),
            TournamentStatus::Open
        );
        assert_eq!(f.store.joinings().len(), 1);
    }

    #[tokio::test]
    async fn test_nothing_to_choose() {
        let f = fixture(1);
        let err = f.settlement.result(None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCandidateSet);

        f.registry.announce("T1", 100).await.unwrap();
        let err = f.settlement.result(Some("T1"), None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCandidateSet);
    }

    #[tokio::test]
    async fn test_random_tournament_for_given_winner() {
        let f = fixture(9);
        for player in ["A", "B"] {
            f.ledger.credit(player, 1000).await.unwrap();
        }
        f.registry.announce("T1", 100).await.unwrap();
        f.registry.announce("T2", 100).await.unwrap();
        f.joins.join("T1", "B", &[]).await.unwrap();
        f.joins.join("T2", "A", &[]).await.unwrap();

        let report = f.settlement.result(None, Some("A")).await.unwrap();
        assert_eq!(report.tournament_id, "T2");
        assert_eq!(
            f.registry.get_status("T1").await.unwrap(),
            TournamentStatus::Open
        );
    }

    #[tokio::test]
    async fn test_random_choices_follow_seed() {
        async fn settle(seed: u64) -> SettlementReport {
            let f = fixture(seed);
            for player in ["A", "B", "C"] {
                f.ledger.credit(player, 1000).await.unwrap();
            }
            for t in ["T1", "T2"] {
                f.registry.announce(t, 90).await.unwrap();
                for player in ["A", "B", "C"] {
                    f.joins.join(t, player, &[]).await.unwrap();
                }
            }
            f.settlement.result(None, None).await.unwrap()
        }

        let first = settle(77).await;
        let second = settle(77).await;
        assert_eq!(first, second);
        assert_eq!(first.prize, 270);
    }

    #[tokio::test]
    async fn test_floor_remainder_not_reconciled() {
        let f = fixture(1);
        for player in ["A", "B", "C"] {
            f.ledger.credit(player, 100).await.unwrap();
        }
        f.registry.announce("T1", 100).await.unwrap();
        f.joins
            .join("T1", "A", &["B".to_string(), "C".to_string()])
            .await
            .unwrap();

        // 3 × 33 collected, 100 paid out as 3 × 33
        let report = f.settlement.result(Some("T1"), Some("A")).await.unwrap();
        assert_eq!(report.prize, 100);
        assert_eq!(report.profit, 33);
        for player in ["A", "B", "C"] {
            assert_eq!(balance(&f, player).await, 100);
        }
    }

    #[tokio::test]
    async fn test_store_failure_during_distribution() {
        let f = fixture(1);
        f.ledger.credit("A", 100).await.unwrap();
        f.ledger.credit("B", 100).await.unwrap();
        f.registry.announce("T1", 100).await.unwrap();
        f.joins.join("T1", "A", &["B".to_string()]).await.unwrap();

        // set_winner, credit A, delete A succeed; credit B fails
        f.store.fail_writes_after(3);
        let err = f
            .settlement
            .result(Some("T1"), Some("A"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

        f.store.heal();
        assert_eq!(balance(&f, "A").await, 100);
        assert_eq!(balance(&f, "B").await, 50);
        assert_eq!(
            f.registry.get_status("T1").await.unwrap(),
            TournamentStatus::Finished
        );
    }

    #[tokio::test]
    async fn test_random_pick_skips_finished_tournament_with_leftovers() {
        for seed in 0..20 {
            let f = fixture(seed);
            for player in ["A", "B", "D"] {
                f.ledger.credit(player, 100).await.unwrap();
            }
            f.registry.announce("T1", 100).await.unwrap();
            f.joins.join("T1", "A", &["B".to_string()]).await.unwrap();

            // set_winner lands, the payout does not
            f.store.fail_writes_after(1);
            let err = f
                .settlement
                .result(Some("T1"), Some("A"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
            f.store.heal();
            assert_eq!(f.store.joinings().len(), 2);

            f.registry.announce("T2", 50).await.unwrap();
            f.joins.join("T2", "D", &[]).await.unwrap();

            let report = f.settlement.result(None, None).await.unwrap();
            assert_eq!(report.tournament_id, "T2", "seed {seed}");
            assert_eq!(report.winner_id, "D");
        }
    }

    #[tokio::test]
    async fn test_only_finished_leftovers_is_empty_candidate_set() {
        let f = fixture(3);
        f.ledger.credit("A", 100).await.unwrap();
        f.registry.announce("T1", 100).await.unwrap();
        f.joins.join("T1", "A", &[]).await.unwrap();

        f.store.fail_writes_after(1);
        f.settlement.result(Some("T1"), None).await.unwrap_err();
        f.store.heal();

        let err = f.settlement.result(None, Some("A")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCandidateSet);
    }

    #[test]
    fn test_acquirers_leader_first() {
        let records = vec![
            JoinRecord::backer("T1", "B", 10, "A"),
            JoinRecord::leader("T1", "C", 10),
            JoinRecord::leader("T1", "A", 10),
        ];
        assert_eq!(acquirers(&records, "A"), vec!["A", "B"]);
        assert!(acquirers(&records, "Z").is_empty());
    }
}
