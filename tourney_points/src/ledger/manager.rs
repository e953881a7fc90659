//! Player ledger: balance credit, debit and lookup.

use super::models::{BalanceView, Player};
use crate::db::{PlayerRepository, Store};
use crate::errors::{PointsError, PointsResult, require_id, require_non_negative};
use crate::sync::{Domains, PlayersHeld};
use log::{debug, warn};
use std::sync::Arc;

/// Player ledger
///
/// Every balance read-modify-write runs inside the players domain. The public
/// methods acquire it themselves; the `*_held` variants are for compound
/// operations that already hold it.
#[derive(Clone)]
pub struct PlayerLedger {
    store: Arc<dyn Store>,
    domains: Arc<Domains>,
}

impl PlayerLedger {
    /// Create a new player ledger
    ///
    /// # Arguments
    ///
    /// * `store` - Persistent store
    /// * `domains` - Domain locks shared with the other components
    pub fn new(store: Arc<dyn Store>, domains: Arc<Domains>) -> Self {
        Self { store, domains }
    }

    /// Credit `amount` points, creating the player on first funding
    ///
    /// # Returns
    ///
    /// * `PointsResult<BalanceView>` - Balance after the credit
    ///
    /// # Errors
    ///
    /// * `PointsError::InvalidArgument` - Empty id, negative amount, or overflow
    pub async fn credit(&self, player_id: &str, amount: i64) -> PointsResult<BalanceView> {
        let held = self.domains.players().await;
        self.credit_held(&held, player_id, amount).await
    }

    /// Debit `amount` points
    ///
    /// # Errors
    ///
    /// * `PointsError::NotFound` - Unknown player
    /// * `PointsError::InsufficientFunds` - Balance lower than `amount`
    pub async fn debit(&self, player_id: &str, amount: i64) -> PointsResult<BalanceView> {
        let held = self.domains.players().await;
        self.debit_held(&held, player_id, amount).await
    }

    /// Current balance
    ///
    /// # Errors
    ///
    /// * `PointsError::NotFound` - Unknown player
    pub async fn get_balance(&self, player_id: &str) -> PointsResult<BalanceView> {
        let held = self.domains.players().await;
        self.balance_held(&held, player_id).await
    }

    /// [`credit`](Self::credit) for callers already holding the players domain
    pub async fn credit_held(
        &self,
        _held: &PlayersHeld<'_>,
        player_id: &str,
        amount: i64,
    ) -> PointsResult<BalanceView> {
        require_id("playerId", player_id)?;
        require_non_negative("points", amount)?;

        let balance = match self.store.find_player(player_id).await? {
            None => {
                self.store
                    .insert_player(&Player::new(player_id, amount))
                    .await?;
                debug!("created player {player_id} with balance {amount}");
                amount
            }
            Some(player) => {
                let balance = player.balance.checked_add(amount).ok_or_else(|| {
                    PointsError::InvalidArgument(format!(
                        "crediting {amount} overflows balance of {player_id}"
                    ))
                })?;
                self.store.update_balance(player_id, balance).await?;
                debug!("credited {amount} to {player_id}, balance {balance}");
                balance
            }
        };

        Ok(BalanceView {
            player_id: player_id.to_string(),
            balance,
        })
    }

    /// [`debit`](Self::debit) for callers already holding the players domain
    pub async fn debit_held(
        &self,
        _held: &PlayersHeld<'_>,
        player_id: &str,
        amount: i64,
    ) -> PointsResult<BalanceView> {
        require_id("playerId", player_id)?;
        require_non_negative("points", amount)?;

        let player = self.find(player_id).await?;
        if player.balance < amount {
            warn!(
                "debit of {amount} from {player_id} refused, balance {}",
                player.balance
            );
            return Err(PointsError::InsufficientFunds {
                player_id: player_id.to_string(),
                available: player.balance,
                required: amount,
            });
        }

        let balance = player.balance - amount;
        self.store.update_balance(player_id, balance).await?;
        debug!("debited {amount} from {player_id}, balance {balance}");

        Ok(BalanceView {
            player_id: player_id.to_string(),
            balance,
        })
    }

    /// [`get_balance`](Self::get_balance) for callers already holding the players domain
    pub async fn balance_held(
        &self,
        _held: &PlayersHeld<'_>,
        player_id: &str,
    ) -> PointsResult<BalanceView> {
        require_id("playerId", player_id)?;
        let player = self.find(player_id).await?;
        Ok(BalanceView::from(&player))
    }

    async fn find(&self, player_id: &str) -> PointsResult<Player> {
        self.store
            .find_player(player_id)
            .await?
            .ok_or_else(|| PointsError::NotFound(format!("player {player_id}")))
    }
}
