//! Player ledger module: point balances that never go negative.
//!
//! Players are created implicitly on first funding, mutated by credit/debit,
//! and never deleted (short of an administrative reset).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tourney_points::db::MemoryStore;
//! use tourney_points::ledger::PlayerLedger;
//! use tourney_points::sync::Domains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = PlayerLedger::new(Arc::new(MemoryStore::new()), Arc::new(Domains::new()));
//!
//!     ledger.credit("P1", 300).await?;
//!     let view = ledger.debit("P1", 100).await?;
//!     println!("{} now holds {}", view.player_id, view.balance);
//!
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::PlayerLedger;
pub use models::{BalanceView, Player, PlayerId};
