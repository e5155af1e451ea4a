//! Aggregation engine
//!
//! Grouped summaries over the filtered sighting set. Grouping and counting
//! happen in SQLite; dominant-category selection, percentages and month
//! zero-filling happen here so the arithmetic is testable on its own.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tick_common::Result;

use super::filters::{Predicate, PredicateSet};

/// Month abbreviations, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map marker data for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySummary {
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub total: i64,
    pub latest_sighting: String,
    pub dominant_category: String,
}

/// Sighting count for one `YYYY-MM` month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShare {
    pub location: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotals {
    pub total: i64,
    pub by_region: Vec<RegionShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub category_detail: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub total: i64,
    pub by_category: Vec<CategoryShare>,
}

/// One calendar month of the seasonal breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub month: &'static str,
    pub month_num: u32,
    pub count: i64,
}

#[derive(sqlx::FromRow)]
struct CityRow {
    location: String,
    total: i64,
    latest: String,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct CityCategoryRow {
    location: String,
    category: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct RegionRow {
    location: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category: String,
    category_detail: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct MonthNumRow {
    month_num: i64,
    count: i64,
}

/// `count / total * 100` rounded to one decimal place, halves away from zero
///
/// Returns 0.0 when `total` is 0.
pub fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Most frequent category; ties go to the lexically smallest name
pub fn dominant_category(counts: &[(String, i64)]) -> Option<&str> {
    let mut best: Option<(&str, i64)> = None;
    for (category, count) in counts {
        let better = match best {
            None => true,
            Some((best_cat, best_count)) => {
                *count > best_count || (*count == best_count && category.as_str() < best_cat)
            }
        };
        if better {
            best = Some((category.as_str(), *count));
        }
    }
    best.map(|(category, _)| category)
}

/// Expand sparse `(month_num, count)` pairs to all twelve months
pub fn zero_fill_months(counts: &[(u32, i64)]) -> Vec<MonthBucket> {
    let by_month: HashMap<u32, i64> = counts.iter().copied().collect();
    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(name, month_num)| MonthBucket {
            month: *name,
            month_num,
            count: by_month.get(&month_num).copied().unwrap_or(0),
        })
        .collect()
}

/// Per-city summary for map markers, largest cities first
pub async fn map_summary(pool: &SqlitePool, filter: &PredicateSet) -> Result<Vec<CitySummary>> {
    // Bare lat/lng alongside MAX() come from the most recent row of each city
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT location, COUNT(*) AS total, MAX(observed_at) AS latest, lat, lng FROM sightings",
    );
    filter.push_where(&mut qb);
    qb.push(" GROUP BY location ORDER BY total DESC, location ASC");
    let cities: Vec<CityRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut qb =
        QueryBuilder::<Sqlite>::new("SELECT location, category, COUNT(*) AS count FROM sightings");
    filter.push_where(&mut qb);
    qb.push(" GROUP BY location, category");
    let pairs: Vec<CityCategoryRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut per_city: HashMap<String, Vec<(String, i64)>> = HashMap::new();
    for row in pairs {
        per_city
            .entry(row.location)
            .or_default()
            .push((row.category, row.count));
    }

    Ok(cities
        .into_iter()
        .map(|city| {
            let dominant = per_city
                .get(&city.location)
                .and_then(|counts| dominant_category(counts))
                .unwrap_or(tick_common::db::UNKNOWN_CATEGORY)
                .to_string();
            CitySummary {
                location: city.location,
                lat: city.lat,
                lng: city.lng,
                total: city.total,
                latest_sighting: city.latest,
                dominant_category: dominant,
            }
        })
        .collect())
}

/// Sparse monthly counts for one city, oldest month first
pub async fn timeline(
    pool: &SqlitePool,
    location: &str,
    filter: &PredicateSet,
) -> Result<Vec<MonthCount>> {
    let filter = filter.clone().and(Predicate::Location(location.to_string()));

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT strftime('%Y-%m', observed_at) AS month, COUNT(*) AS count FROM sightings",
    );
    filter.push_where(&mut qb);
    qb.push(" GROUP BY month ORDER BY month");

    Ok(qb.build_query_as().fetch_all(pool).await?)
}

/// Count and share of the filtered total per city
pub async fn stats_by_region(pool: &SqlitePool, filter: &PredicateSet) -> Result<RegionTotals> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT location, COUNT(*) AS count FROM sightings");
    filter.push_where(&mut qb);
    qb.push(" GROUP BY location ORDER BY count DESC, location ASC");
    let rows: Vec<RegionRow> = qb.build_query_as().fetch_all(pool).await?;

    let total: i64 = rows.iter().map(|r| r.count).sum();
    Ok(RegionTotals {
        total,
        by_region: rows
            .into_iter()
            .map(|r| RegionShare {
                percentage: percentage(r.count, total),
                location: r.location,
                count: r.count,
            })
            .collect(),
    })
}

/// Count and share of the filtered total per category
pub async fn stats_by_category(
    pool: &SqlitePool,
    filter: &PredicateSet,
) -> Result<CategoryTotals> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT category, MAX(category_detail) AS category_detail, COUNT(*) AS count FROM sightings",
    );
    filter.push_where(&mut qb);
    qb.push(" GROUP BY category ORDER BY count DESC, category ASC");
    let rows: Vec<CategoryRow> = qb.build_query_as().fetch_all(pool).await?;

    let total: i64 = rows.iter().map(|r| r.count).sum();
    Ok(CategoryTotals {
        total,
        by_category: rows
            .into_iter()
            .map(|r| CategoryShare {
                percentage: percentage(r.count, total),
                category: r.category,
                category_detail: r.category_detail,
                count: r.count,
            })
            .collect(),
    })
}

/// Twelve-month breakdown for one city, optionally limited to one year
pub async fn seasonal(
    pool: &SqlitePool,
    location: &str,
    year: Option<i32>,
) -> Result<Vec<MonthBucket>> {
    let mut filter = PredicateSet::new().and(Predicate::Location(location.to_string()));
    if let Some(year) = year {
        filter.push(Predicate::Year(year));
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT CAST(strftime('%m', observed_at) AS INTEGER) AS month_num, COUNT(*) AS count FROM sightings",
    );
    filter.push_where(&mut qb);
    qb.push(" GROUP BY month_num");
    let rows: Vec<MonthNumRow> = qb.build_query_as().fetch_all(pool).await?;

    let counts: Vec<(u32, i64)> = rows
        .into_iter()
        .filter_map(|r| u32::try_from(r.month_num).ok().map(|m| (m, r.count)))
        .collect();

    Ok(zero_fill_months(&counts))
}
