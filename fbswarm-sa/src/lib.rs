//! fbswarm-sa library - Swarm Analysis module
//!
//! Scores feedback items with five heuristic agents, keeps the append-only
//! score history and maintains the global priority ranking.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod ranking;
pub mod swarm;

pub use crate::error::{ApiError, ApiResult, SwarmError};

use crate::swarm::SwarmRunner;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Swarm runner, owning the ranking store and jitter source
    pub runner: SwarmRunner,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, runner: SwarmRunner) -> Self {
        Self {
            db,
            runner,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::feedback_routes())
        .merge(api::analyze_routes())
        .merge(api::score_routes())
        .merge(api::priority_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
