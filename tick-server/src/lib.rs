//! tick-server library - tick sighting ingestion and query service
//!
//! Reconciles the bootstrap snapshot and the external feed into one SQLite
//! store, then serves filtered listings and aggregated statistics over HTTP.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tick_common::CityTable;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod ingest;
pub mod pagination;
pub mod query;

/// Multipart limit for `/report`: the image cap plus room for the text fields
const REPORT_BODY_LIMIT: usize = api::report::MAX_IMAGE_BYTES + 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Sighting store connection pool
    pub db: SqlitePool,
    /// Immutable city coordinate table
    pub cities: Arc<CityTable>,
    /// Directory holding submitted images, served under `/uploads`
    pub upload_dir: PathBuf,
    /// Optional frontend served under `/app` and `/static`
    pub frontend_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(db: SqlitePool, cities: Arc<CityTable>, upload_dir: PathBuf) -> Self {
        Self {
            db,
            cities,
            upload_dir,
            frontend_dir: None,
        }
    }

    pub fn with_frontend(mut self, frontend_dir: Option<PathBuf>) -> Self {
        self.frontend_dir = frontend_dir;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/sightings", get(api::list_sightings))
        .route("/sightings/map", get(api::sightings_map))
        .route("/sightings/timeline/:location", get(api::sightings_timeline))
        .route("/stats/by-region", get(api::stats_by_region))
        .route("/stats/by-category", get(api::stats_by_category))
        .route("/stats/by-species", get(api::stats_by_category))
        .route("/stats/seasonal", get(api::stats_seasonal))
        .route("/meta/cities", get(api::list_cities))
        .route("/meta/categories", get(api::categories))
        .route("/meta/species", get(api::categories))
        .route(
            "/report",
            post(api::submit_report).layer(DefaultBodyLimit::max(REPORT_BODY_LIMIT)),
        )
        .merge(api::health_routes());

    let mut app = api.nest_service("/uploads", ServeDir::new(&state.upload_dir));

    if let Some(frontend) = &state.frontend_dir {
        app = app
            .route_service("/app", ServeFile::new(frontend.join("index.html")))
            .nest_service("/static", ServeDir::new(frontend));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
