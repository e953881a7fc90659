//! Tournament API handlers: announce, join and result.
//!
//! # Examples
//!
//! Announce a tournament with a 1000 point deposit:
//! ```bash
//! curl "http://localhost:3000/announceTournament?tournamentId=1&deposit=1000"
//! ```
//!
//! Join with P1 leading and P2, P3 backing:
//! ```bash
//! curl "http://localhost:3000/joinTournament?tournamentId=1&playerId=P1&backerId=P2&backerId=P3"
//! ```
//!
//! Settle, letting the server pick the winner:
//! ```bash
//! curl "http://localhost:3000/resultTournament?tournamentId=1"
//! # {"tournamentId":"1","winners":[{"playerId":"P1","prize":1000}]}
//! ```

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tourney_points::SettlementReport;

use super::AppState;
use super::error::{ApiError, Operation};
use super::params::QueryParams;
use super::request_id::RequestId;
use crate::metrics;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WinnerEntry {
    pub player_id: String,
    pub prize: i64,
}

/// Settlement result in wire form
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub tournament_id: String,
    pub winners: Vec<WinnerEntry>,
}

impl From<SettlementReport> for ResultResponse {
    fn from(report: SettlementReport) -> Self {
        Self {
            tournament_id: report.tournament_id,
            winners: vec![WinnerEntry {
                player_id: report.winner_id,
                prize: report.prize,
            }],
        }
    }
}

/// Open a tournament with a per-group entry deposit
pub async fn announce(
    State(state): State<AppState>,
    request_id: RequestId,
    params: QueryParams,
) -> Result<StatusCode, ApiError> {
    let tournament_id = params.required("tournamentId").during("announce")?;
    let deposit = params.required_i64("deposit").during("announce")?;

    state
        .engine
        .announce(tournament_id, deposit)
        .await
        .during("announce")?;

    tracing::info!(
        request_id = %request_id.as_str(),
        tournament_id = %tournament_id,
        deposit = deposit,
        "Tournament announced"
    );

    Ok(StatusCode::OK)
}

/// Admit `playerId` and every `backerId` as one fee-sharing group
pub async fn join(
    State(state): State<AppState>,
    request_id: RequestId,
    params: QueryParams,
) -> Result<StatusCode, ApiError> {
    let tournament_id = params.required("tournamentId").during("join")?;
    let leader_id = params.required("playerId").during("join")?;
    let backer_ids = params.all("backerId");

    let records = state
        .engine
        .join(tournament_id, leader_id, &backer_ids)
        .await
        .during("join")?;

    let fee = records.first().map_or(0, |r| r.contributed);
    metrics::points_moved_total("join", fee * records.len() as i64);

    tracing::info!(
        request_id = %request_id.as_str(),
        tournament_id = %tournament_id,
        leader_id = %leader_id,
        backers = backer_ids.len(),
        fee = fee,
        "Group joined"
    );

    Ok(StatusCode::OK)
}

/// Settle a tournament; both `tournamentId` and `playerId` are optional
pub async fn result(
    State(state): State<AppState>,
    request_id: RequestId,
    params: QueryParams,
) -> Result<Json<ResultResponse>, ApiError> {

    let report = state
        .engine
        .result(params.optional("tournamentId"), params.optional("playerId"))
        .await
        .during("result")?;

    metrics::points_moved_total("result", report.profit * report.acquirers.len() as i64);
    metrics::prize_points(report.prize);

    tracing::info!(
        request_id = %request_id.as_str(),
        tournament_id = %report.tournament_id,
        winner_id = %report.winner_id,
        prize = report.prize,
        acquirers = report.acquirers.len(),
        "Tournament settled"
    );

    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_wire_shape() {
        let report = SettlementReport {
            tournament_id: "1".to_string(),
            winner_id: "P1".to_string(),
            prize: 500,
            profit: 250,
            acquirers: vec!["P1".to_string(), "P2".to_string()],
        };
        let json = serde_json::to_value(ResultResponse::from(report)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tournamentId": "1",
                "winners": [{"playerId": "P1", "prize": 500}]
            })
        );
    }
}
