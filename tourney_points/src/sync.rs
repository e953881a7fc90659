//! Domain-wide mutual exclusion.
//!
//! State lives in three logical domains (players, joins, tournaments), each
//! guarded by one async mutex. Holding a domain is represented by a guard type;
//! code that must run inside a domain's critical section takes `&PlayersHeld`,
//! `&JoinsHeld` or `&TournamentsHeld` rather than locking again.
//!
//! Compound operations acquire every domain through [`Domains::all`], which
//! always locks players, then joins, then tournaments.

use tokio::sync::{Mutex, MutexGuard};

/// The three domain mutexes
#[derive(Debug, Default)]
pub struct Domains {
    players: Mutex<()>,
    joins: Mutex<()>,
    tournaments: Mutex<()>,
}

/// Proof that the players domain is held
#[derive(Debug)]
pub struct PlayersHeld<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Proof that the joins domain is held
#[derive(Debug)]
pub struct JoinsHeld<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// Proof that the tournaments domain is held
#[derive(Debug)]
pub struct TournamentsHeld<'a> {
    _guard: MutexGuard<'a, ()>,
}

/// All three domains, acquired in global order
#[derive(Debug)]
pub struct AllHeld<'a> {
    pub players: PlayersHeld<'a>,
    pub joins: JoinsHeld<'a>,
    pub tournaments: TournamentsHeld<'a>,
}

impl Domains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the players domain alone
    pub async fn players(&self) -> PlayersHeld<'_> {
        PlayersHeld {
            _guard: self.players.lock().await,
        }
    }

    /// Lock the tournaments domain alone
    pub async fn tournaments(&self) -> TournamentsHeld<'_> {
        TournamentsHeld {
            _guard: self.tournaments.lock().await,
        }
    }

    /// Lock players → joins → tournaments
    ///
    /// The joins domain is only reachable through here: join records are
    /// always mutated together with balances or tournament state.
    pub async fn all(&self) -> AllHeld<'_> {
        let players = PlayersHeld {
            _guard: self.players.lock().await,
        };
        let joins = JoinsHeld {
            _guard: self.joins.lock().await,
        };
        let tournaments = TournamentsHeld {
            _guard: self.tournaments.lock().await,
        };
        AllHeld {
            players,
            joins,
            tournaments,
        }
    }
}
