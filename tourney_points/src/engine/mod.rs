//! Points engine: the ledger, the tournament registry and the two compound
//! operations (join and settlement) wired over one store and one lock set.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tourney_points::db::MemoryStore;
//! use tourney_points::engine::PointsEngine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = PointsEngine::new(Arc::new(MemoryStore::new()));
//!
//!     engine.fund("A", 1000).await?;
//!     engine.fund("B", 1000).await?;
//!     engine.announce("T1", 200).await?;
//!     engine.join("T1", "A", &["B".to_string()]).await?;
//!
//!     let report = engine.result(Some("T1"), Some("A")).await?;
//!     println!("{} won {}", report.winner_id, report.prize);
//!
//!     Ok(())
//! }
//! ```

pub mod join;
pub mod settlement;

pub use join::JoinCoordinator;
pub use settlement::SettlementEngine;

use crate::db::Store;
use crate::errors::PointsResult;
use crate::ledger::{BalanceView, PlayerLedger};
use crate::selector::RandomSelector;
use crate::sync::Domains;
use crate::tournament::{JoinRecord, SettlementReport, Tournament, TournamentRegistry};
use log::info;
use std::sync::Arc;

/// Entry point for every points operation
#[derive(Clone)]
pub struct PointsEngine {
    store: Arc<dyn Store>,
    domains: Arc<Domains>,
    ledger: PlayerLedger,
    registry: TournamentRegistry,
    joins: JoinCoordinator,
    settlement: SettlementEngine,
}

impl PointsEngine {
    /// Engine drawing random choices from the operating system
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_selector(store, RandomSelector::from_entropy())
    }

    /// Engine with an explicit random source
    pub fn with_selector(store: Arc<dyn Store>, selector: RandomSelector) -> Self {
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
            domains.clone(),
            ledger.clone(),
            registry.clone(),
            Arc::new(selector),
        );

        Self {
            store,
            domains,
            ledger,
            registry,
            joins,
            settlement,
        }
    }

    /// Add points to a player, creating it when absent
    pub async fn fund(&self, player_id: &str, points: i64) -> PointsResult<BalanceView> {
        self.ledger.credit(player_id, points).await
    }

    /// Withdraw points from a player
    pub async fn take(&self, player_id: &str, points: i64) -> PointsResult<BalanceView> {
        self.ledger.debit(player_id, points).await
    }

    pub async fn balance(&self, player_id: &str) -> PointsResult<BalanceView> {
        self.ledger.get_balance(player_id).await
    }

    pub async fn announce(&self, tournament_id: &str, deposit: i64) -> PointsResult<Tournament> {
        self.registry.announce(tournament_id, deposit).await
    }

    pub async fn tournament(&self, tournament_id: &str) -> PointsResult<Tournament> {
        self.registry.get(tournament_id).await
    }

    /// See [`JoinCoordinator::join`]
    pub async fn join(
        &self,
        tournament_id: &str,
        leader_id: &str,
        backer_ids: &[String],
    ) -> PointsResult<Vec<JoinRecord>> {
        self.joins.join(tournament_id, leader_id, backer_ids).await
    }

    /// See [`SettlementEngine::result`]
    pub async fn result(
        &self,
        tournament_id: Option<&str>,
        winner_id: Option<&str>,
    ) -> PointsResult<SettlementReport> {
        self.settlement.result(tournament_id, winner_id).await
    }

    /// Clear players, join records and tournaments
    pub async fn reset(&self) -> PointsResult<()> {
        let _held = self.domains.all().await;
        self.store.reset().await?;
        info!("all domains reset");
        Ok(())
    }

    /// Probe the backing store
    pub async fn health_check(&self) -> PointsResult<()> {
        self.store.health_check().await?;
        Ok(())
    }
}
