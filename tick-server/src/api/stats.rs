//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::query::{self, parse_year, CategoryTotals, FilterParams, MonthBucket, PredicateSet, RegionTotals};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonalQuery {
    pub location: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeasonalResponse {
    pub location: String,
    /// The requested year, or `"all years"`
    pub year: String,
    pub data: Vec<MonthBucket>,
}

/// GET /stats/by-region
pub async fn stats_by_region(
    State(state): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> ApiResult<Json<RegionTotals>> {
    let filter = PredicateSet::from_params(&FilterParams {
        start_date: params.start_date,
        end_date: params.end_date,
        ..Default::default()
    })?;

    Ok(Json(query::stats_by_region(&state.db, &filter).await?))
}

/// GET /stats/by-category (also /stats/by-species)
pub async fn stats_by_category(
    State(state): State<AppState>,
    Query(params): Query<CategoryQuery>,
) -> ApiResult<Json<CategoryTotals>> {
    let filter = PredicateSet::from_params(&FilterParams {
        location: params.location,
        ..Default::default()
    })?;

    Ok(Json(query::stats_by_category(&state.db, &filter).await?))
}

/// GET /stats/seasonal
///
/// Always twelve entries, January first.
pub async fn stats_seasonal(
    State(state): State<AppState>,
    Query(params): Query<SeasonalQuery>,
) -> ApiResult<Json<SeasonalResponse>> {
    let location = params
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("location is required".to_string()))?
        .to_string();
    let year = parse_year(params.year.as_deref())?;

    let data = query::seasonal(&state.db, &location, year).await?;
    Ok(Json(SeasonalResponse {
        location,
        year: year.map_or_else(|| "all years".to_string(), |y| y.to_string()),
        data,
    }))
}
