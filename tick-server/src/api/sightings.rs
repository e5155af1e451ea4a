//! Sighting listing, map and timeline endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::pagination::{PageRequest, DEFAULT_PER_PAGE};
use crate::query::{self, CitySummary, FilterParams, MonthCount, PredicateSet, SightingPage};
use crate::AppState;

/// Query parameters for `GET /sightings`
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub location: Option<String>,
    #[serde(alias = "species")]
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

/// Query parameters for `GET /sightings/map`
#[derive(Debug, Deserialize)]
pub struct MapQuery {
    #[serde(alias = "species")]
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameters for `GET /sightings/timeline/:location`
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    #[serde(alias = "species")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub location: String,
    pub timeline: Vec<MonthCount>,
}

/// GET /sightings
///
/// Filtered sightings, newest first, one page at a time.
pub async fn list_sightings(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<SightingPage>> {
    let page = PageRequest::new(params.page, params.per_page)?;
    let filter = PredicateSet::from_params(&FilterParams {
        location: params.location,
        category: params.category,
        start_date: params.start_date,
        end_date: params.end_date,
    })?;

    Ok(Json(query::list_sightings(&state.db, &filter, page).await?))
}

/// GET /sightings/map
pub async fn sightings_map(
    State(state): State<AppState>,
    Query(params): Query<MapQuery>,
) -> ApiResult<Json<Vec<CitySummary>>> {
    let filter = PredicateSet::from_params(&FilterParams {
        category: params.category,
        start_date: params.start_date,
        end_date: params.end_date,
        ..Default::default()
    })?;

    Ok(Json(query::map_summary(&state.db, &filter).await?))
}

/// GET /sightings/timeline/:location
///
/// Months without sightings are absent from the result.
pub async fn sightings_timeline(
    State(state): State<AppState>,
    Path(location): Path<String>,
    Query(params): Query<TimelineQuery>,
) -> ApiResult<Json<TimelineResponse>> {
    let filter = PredicateSet::from_params(&FilterParams {
        category: params.category,
        ..Default::default()
    })?;

    let timeline = query::timeline(&state.db, &location, &filter).await?;
    Ok(Json(TimelineResponse { location, timeline }))
}
