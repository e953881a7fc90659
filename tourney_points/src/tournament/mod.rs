//! Tournament module: identity, entry deposit, open/finished status and
//! the join records that escrow entry fees.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tourney_points::db::MemoryStore;
//! use tourney_points::sync::Domains;
//! use tourney_points::tournament::TournamentRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = TournamentRegistry::new(Arc::new(MemoryStore::new()), Arc::new(Domains::new()));
//!
//!     registry.announce("T1", 1000).await?;
//!     println!("T1 is {}", registry.get_status("T1").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod registry;

pub use models::{
    Entry, JoinRecord, SettlementReport, Tournament, TournamentId, TournamentStatus,
};
pub use registry::TournamentRegistry;
