//! Repository trait definitions for the three persisted domains.
//!
//! The core engine only talks to these traits, so the PostgreSQL store and the
//! in-memory store are interchangeable behind an `Arc<dyn Store>`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::errors::StoreResult;
use super::timeouts::{with_default_timeout, with_long_timeout};
use crate::ledger::Player;
use crate::tournament::{JoinRecord, Tournament};

/// Trait for player balance persistence
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Find player by ID
    async fn find_player(&self, player_id: &str) -> StoreResult<Option<Player>>;

    /// Insert a new player
    async fn insert_player(&self, player: &Player) -> StoreResult<()>;

    /// Overwrite a player's balance
    async fn update_balance(&self, player_id: &str, balance: i64) -> StoreResult<()>;
}

/// Trait for tournament persistence
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Find tournament by ID
    async fn find_tournament(&self, tournament_id: &str) -> StoreResult<Option<Tournament>>;

    /// Insert a newly announced tournament
    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()>;

    /// Record the winner, finishing the tournament
    async fn set_winner(
        &self,
        tournament_id: &str,
        winner_id: &str,
        finished_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

/// Trait for join record persistence
#[async_trait]
pub trait JoinRepository: Send + Sync {
    /// Insert a join record
    async fn insert_join(&self, record: &JoinRecord) -> StoreResult<()>;

    /// Delete every record of `player_id` in `tournament_id`, returning how many were removed
    async fn delete_join(&self, tournament_id: &str, player_id: &str) -> StoreResult<u64>;

    /// All records of a tournament, in insertion order
    async fn joins_for_tournament(&self, tournament_id: &str) -> StoreResult<Vec<JoinRecord>>;

    /// Leader entries across every tournament
    async fn leader_entries(&self) -> StoreResult<Vec<JoinRecord>>;

    /// Leader entries owned by `leader_id` across every tournament
    async fn leader_entries_for(&self, leader_id: &str) -> StoreResult<Vec<JoinRecord>>;
}

/// Complete persistent store consumed by the engine
#[async_trait]
pub trait Store: PlayerRepository + TournamentRepository + JoinRepository {
    /// Clear players, join records and tournaments
    async fn reset(&self) -> StoreResult<()>;

    /// Check that the store answers
    async fn health_check(&self) -> StoreResult<()>;
}

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS players (
        playerid   TEXT PRIMARY KEY,
        balance    BIGINT NOT NULL CHECK (balance >= 0),
        created_at TIMESTAMP NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tournaments (
        tourid       TEXT PRIMARY KEY,
        deposit      BIGINT NOT NULL CHECK (deposit >= 0),
        playerid     TEXT,
        announced_at TIMESTAMP NOT NULL DEFAULT NOW(),
        finished_at  TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS joinings (
        id           BIGSERIAL PRIMARY KEY,
        tourid       TEXT NOT NULL,
        playerid     TEXT NOT NULL,
        contribute   BIGINT NOT NULL,
        contributeto TEXT NOT NULL,
        joined_at    TIMESTAMP NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS joinings_tourid_idx ON joinings (tourid)",
];

/// PostgreSQL implementation of [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `players`, `tournaments` and `joinings` tables if absent
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            with_long_timeout(sqlx::query(statement).execute(&self.pool)).await?;
        }
        Ok(())
    }

    fn join_from_row(row: &PgRow) -> JoinRecord {
        JoinRecord::from_columns(
            row.get("tourid"),
            row.get("playerid"),
            row.get("contribute"),
            row.get("contributeto"),
            row.get::<NaiveDateTime, _>("joined_at").and_utc(),
        )
    }
}

#[async_trait]
impl PlayerRepository for PgStore {
    async fn find_player(&self, player_id: &str) -> StoreResult<Option<Player>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT playerid, balance, created_at, updated_at FROM players WHERE playerid = $1",
            )
            .bind(player_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| Player {
            player_id: r.get("playerid"),
            balance: r.get("balance"),
            created_at: r.get::<NaiveDateTime, _>("created_at").and_utc(),
            updated_at: r.get::<NaiveDateTime, _>("updated_at").and_utc(),
        }))
    }

    async fn insert_player(&self, player: &Player) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                "INSERT INTO players (playerid, balance, created_at, updated_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(&player.player_id)
            .bind(player.balance)
            .bind(player.created_at.naive_utc())
            .bind(player.updated_at.naive_utc())
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn update_balance(&self, player_id: &str, balance: i64) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query("UPDATE players SET balance = $1, updated_at = NOW() WHERE playerid = $2")
                .bind(balance)
                .bind(player_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TournamentRepository for PgStore {
    async fn find_tournament(&self, tournament_id: &str) -> StoreResult<Option<Tournament>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT tourid, deposit, playerid, announced_at, finished_at
                 FROM tournaments WHERE tourid = $1",
            )
            .bind(tournament_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| Tournament {
            tournament_id: r.get("tourid"),
            deposit: r.get("deposit"),
            winner_id: r.get("playerid"),
            announced_at: r.get::<NaiveDateTime, _>("announced_at").and_utc(),
            finished_at: r
                .get::<Option<NaiveDateTime>, _>("finished_at")
                .map(|dt| dt.and_utc()),
        }))
    }

    async fn insert_tournament(&self, tournament: &Tournament) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                "INSERT INTO tournaments (tourid, deposit, announced_at) VALUES ($1, $2, $3)",
            )
            .bind(&tournament.tournament_id)
            .bind(tournament.deposit)
            .bind(tournament.announced_at.naive_utc())
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn set_winner(
        &self,
        tournament_id: &str,
        winner_id: &str,
        finished_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query("UPDATE tournaments SET playerid = $1, finished_at = $2 WHERE tourid = $3")
                .bind(winner_id)
                .bind(finished_at.naive_utc())
                .bind(tournament_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl JoinRepository for PgStore {
    async fn insert_join(&self, record: &JoinRecord) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                "INSERT INTO joinings (tourid, playerid, contribute, contributeto, joined_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&record.tournament_id)
            .bind(&record.player_id)
            .bind(record.contributed)
            .bind(record.leader_id())
            .bind(record.joined_at.naive_utc())
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn delete_join(&self, tournament_id: &str, player_id: &str) -> StoreResult<u64> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM joinings WHERE tourid = $1 AND playerid = $2")
                .bind(tournament_id)
                .bind(player_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    async fn joins_for_tournament(&self, tournament_id: &str) -> StoreResult<Vec<JoinRecord>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT tourid, playerid, contribute, contributeto, joined_at
                 FROM joinings WHERE tourid = $1 ORDER BY id",
            )
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(Self::join_from_row).collect())
    }

    async fn leader_entries(&self) -> StoreResult<Vec<JoinRecord>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT tourid, playerid, contribute, contributeto, joined_at
                 FROM joinings WHERE playerid = contributeto ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(Self::join_from_row).collect())
    }

    async fn leader_entries_for(&self, leader_id: &str) -> StoreResult<Vec<JoinRecord>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT tourid, playerid, contribute, contributeto, joined_at
                 FROM joinings WHERE playerid = contributeto AND playerid = $1 ORDER BY id",
            )
            .bind(leader_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(Self::join_from_row).collect())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn reset(&self) -> StoreResult<()> {
        with_long_timeout(
            sqlx::query("TRUNCATE players, joinings, tournaments").execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}
