//! # Tourney Points
//!
//! A points economy for players who fund and withdraw balances and enter
//! tournaments, optionally backed by other players who share the entry fee
//! and any resulting prize.
//!
//! The engine guarantees that balances never go negative, that a group's
//! entry fees are all checked before any is debited, that a tournament is
//! settled exactly once, and that joins and settlements neither mint nor
//! burn points beyond the documented floor-division remainder.
//!
//! ## Architecture
//!
//! State lives in three domains, each behind one async mutex:
//!
//! - **players**: balances, owned by [`ledger::PlayerLedger`]
//! - **joins**: escrow records, written by [`engine::JoinCoordinator`] and
//!   evicted by [`engine::SettlementEngine`]
//! - **tournaments**: identity, deposit and winner, owned by
//!   [`tournament::TournamentRegistry`]
//!
//! Compound operations lock players → joins → tournaments (see [`sync`]).
//! Persistence goes through the [`db::Store`] traits, implemented for
//! PostgreSQL and for an in-memory map.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tourney_points::{MemoryStore, PointsEngine, RandomSelector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tourney_points::PointsError> {
//!     let engine = PointsEngine::with_selector(Arc::new(MemoryStore::new()), RandomSelector::seeded(1));
//!
//!     engine.fund("A", 1000).await?;
//!     engine.announce("T1", 200).await?;
//!     engine.join("T1", "A", &[]).await?;
//!     assert_eq!(engine.balance("A").await?.balance, 800);
//!
//!     Ok(())
//! }
//! ```

/// Persistent store traits and implementations.
pub mod db;

/// Compound operations and the engine facade.
pub mod engine;

/// Error taxonomy.
pub mod errors;

/// Player balances.
pub mod ledger;

/// Uniform random choice.
pub mod selector;

/// Domain lock set.
pub mod sync;

/// Tournament identity and join records.
pub mod tournament;

pub use db::{MemoryStore, PgStore, Store};
pub use engine::PointsEngine;
pub use errors::{ErrorKind, PointsError, PointsResult};
pub use ledger::{BalanceView, PlayerId};
pub use selector::RandomSelector;
pub use tournament::{Entry, JoinRecord, SettlementReport, TournamentId, TournamentStatus};
