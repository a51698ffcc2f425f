//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub auth_cache: CacheInfo,
}

/// Basic-auth result cache counters
#[derive(Serialize, ToSchema)]
pub struct CacheInfo {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.cache.stats();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
        auth_cache: CacheInfo {
            entries: state.cache.entry_count(),
            hits: stats.hits(),
            misses: stats.misses(),
        },
    })
}
