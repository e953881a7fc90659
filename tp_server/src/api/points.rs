//! Balance API handlers: fund, take, balance and the administrative reset.
//!
//! # Examples
//!
//! ```bash
//! curl "http://localhost:3000/fund?playerId=P1&points=300"
//! curl "http://localhost:3000/take?playerId=P1&points=100"
//! curl "http://localhost:3000/balance?playerId=P1"
//! # {"playerId":"P1","balance":200}
//! ```

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tourney_points::BalanceView;

use super::AppState;
use super::error::{ApiError, Operation};
use super::params::QueryParams;
use super::request_id::RequestId;
use crate::metrics;

/// Credit points, creating the player on first funding
pub async fn fund(
    State(state): State<AppState>,
    request_id: RequestId,
    params: QueryParams,
) -> Result<StatusCode, ApiError> {
    let player_id = params.required("playerId").during("fund")?;
    let points = params.required_i64("points").during("fund")?;

    let view = state.engine.fund(player_id, points).await.during("fund")?;
    metrics::points_moved_total("fund", points);

    tracing::info!(
        request_id = %request_id.as_str(),
        player_id = %view.player_id,
        points = points,
        balance = view.balance,
        "Player funded"
    );

    Ok(StatusCode::OK)
}

/// Withdraw points
pub async fn take(
    State(state): State<AppState>,
    request_id: RequestId,
    params: QueryParams,
) -> Result<StatusCode, ApiError> {
    let player_id = params.required("playerId").during("take")?;
    let points = params.required_i64("points").during("take")?;

    let view = state.engine.take(player_id, points).await.during("take")?;
    metrics::points_moved_total("take", points);

    tracing::info!(
        request_id = %request_id.as_str(),
        player_id = %view.player_id,
        points = points,
        balance = view.balance,
        "Points taken"
    );

    Ok(StatusCode::OK)
}

/// Current balance of one player
pub async fn balance(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<BalanceView>, ApiError> {
    let player_id = params.required("playerId").during("balance")?;

    let view = state.engine.balance(player_id).await.during("balance")?;
    Ok(Json(view))
}

/// Clear every player, tournament and join record
pub async fn reset(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<StatusCode, ApiError> {
    state.engine.reset().await.during("reset")?;

    tracing::warn!(request_id = %request_id.as_str(), "All points data reset");

    Ok(StatusCode::OK)
}
