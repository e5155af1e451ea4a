//! Raw sighting listing and category metadata

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tick_common::db::Sighting;
use tick_common::Result;

use super::filters::PredicateSet;
use crate::pagination::{total_pages, PageRequest};

const SIGHTING_COLUMNS: &str =
    "id, observed_at, location, category, category_detail, lat, lng, attachment_ref, source_label";

/// One page of matching sightings, newest first
#[derive(Debug, Serialize)]
pub struct SightingPage {
    pub data: Vec<Sighting>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// A distinct category as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CategoryInfo {
    pub category: String,
    pub category_detail: String,
}

/// Count matches, then fetch the requested slice ordered by `observed_at` desc
pub async fn list_sightings(
    pool: &SqlitePool,
    filter: &PredicateSet,
    page: PageRequest,
) -> Result<SightingPage> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM sightings");
    filter.push_where(&mut count_qb);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM sightings", SIGHTING_COLUMNS));
    filter.push_where(&mut qb);
    qb.push(" ORDER BY observed_at DESC, id ASC LIMIT ")
        .push_bind(page.per_page)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let data: Vec<Sighting> = qb.build_query_as().fetch_all(pool).await?;

    Ok(SightingPage {
        data,
        total,
        page: page.page,
        per_page: page.per_page,
        total_pages: total_pages(total, page.per_page),
    })
}

/// Distinct `(category, category_detail)` pairs ordered by category
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<CategoryInfo>> {
    let rows = sqlx::query_as::<_, CategoryInfo>(
        "SELECT DISTINCT category, category_detail FROM sightings ORDER BY category, category_detail",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
