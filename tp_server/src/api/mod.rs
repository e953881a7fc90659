//! HTTP API for the points server.
//!
//! Every operation takes its arguments from the query string and is served
//! on both `GET` and `POST`. A `POST` may also carry them as a url-encoded
//! form body, appended after any query pairs.
//!
//! # Endpoints Overview
//!
//! ```text
//! /fund?playerId=P1&points=300                                     - Credit points
//! /take?playerId=P1&points=300                                     - Withdraw points
//! /announceTournament?tournamentId=1&deposit=1000                  - Open a tournament
//! /joinTournament?tournamentId=1&playerId=P1&backerId=P2&backerId=P3
//!                                                                  - Join with backers
//! /resultTournament?tournamentId=1&playerId=P1                     - Settle (both optional)
//! /balance?playerId=P1                                             - {"playerId","balance"}
//! /reset                                                           - Clear everything
//! /health                                                          - Store health
//! ```
//!
//! Failures return `{"error": <message>, "kind": <error kind>}` with a status
//! derived from the kind (see [`error::status_for`]).
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tp_server::api::{create_router, AppState};
//! use tourney_points::{MemoryStore, PointsEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     engine: PointsEngine::new(Arc::new(MemoryStore::new())),
//! };
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively.

pub mod error;
pub mod params;
pub mod points;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use tourney_points::PointsEngine;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the engine is a bundle of `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub engine: PointsEngine,
}

/// Create the API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/fund", get(points::fund).post(points::fund))
        .route("/take", get(points::take).post(points::take))
        .route("/balance", get(points::balance))
        .route("/reset", get(points::reset).post(points::reset))
        .route(
            "/announceTournament",
            get(tournaments::announce).post(tournaments::announce),
        )
        .route(
            "/joinTournament",
            get(tournaments::join).post(tournaments::join),
        )
        .route(
            "/resultTournament",
            get(tournaments::result).post(tournaments::result),
        )
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.engine.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
