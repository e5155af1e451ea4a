//! Read side: filter predicates, aggregations and the paginated listing

pub mod aggregate;
pub mod filters;
pub mod listing;

pub use aggregate::{
    map_summary, seasonal, stats_by_category, stats_by_region, timeline, CategoryTotals,
    CitySummary, MonthBucket, MonthCount, RegionTotals,
};
pub use filters::{parse_year, FilterParams, Predicate, PredicateSet};
pub use listing::{list_categories, list_sightings, CategoryInfo, SightingPage};
