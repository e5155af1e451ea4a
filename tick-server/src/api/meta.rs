//! Metadata endpoints: known cities and stored categories

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::ApiResult;
use crate::query::{list_categories, CategoryInfo};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CityInfo {
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

/// GET /meta/cities
pub async fn list_cities(State(state): State<AppState>) -> Json<Vec<CityInfo>> {
    Json(
        state
            .cities
            .sorted()
            .into_iter()
            .map(|c| CityInfo {
                city: c.name,
                lat: c.lat,
                lng: c.lng,
            })
            .collect(),
    )
}

/// GET /meta/categories (also /meta/species)
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryInfo>>> {
    Ok(Json(list_categories(&state.db).await?))
}
