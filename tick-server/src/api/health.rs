//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tick_common::db::count_sightings;

use crate::error::ApiResult;
use crate::AppState;

/// Health check response: status, module name, version and row count
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub sightings_in_database: i64,
}

/// GET /health (also GET /)
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let sightings_in_database = count_sightings(&state.db).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        module: "tick-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sightings_in_database,
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}
