//! Filter predicate builder
//!
//! Every read operation turns its query parameters into one [`PredicateSet`]
//! and pushes it onto a `sqlx::QueryBuilder`. Predicates are joined with
//! `AND` and every value is a bound parameter.

use chrono::NaiveDateTime;
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite};
use tick_common::time::{end_of_day, format_timestamp, parse_date, start_of_day};
use tick_common::{Error, Result};

/// Raw filter parameters as supplied by a caller
///
/// Blank values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub location: Option<String>,
    #[serde(alias = "species")]
    pub category: Option<String>,
    /// `YYYY-MM-DD`, inclusive from 00:00:00
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive through 23:59:59
    pub end_date: Option<String>,
}

/// One conjunct of a filter
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive exact match on `location`
    Location(String),
    /// Case-insensitive exact match on `category`
    Category(String),
    /// `observed_at >= bound`
    ObservedFrom(NaiveDateTime),
    /// `observed_at <= bound`
    ObservedUntil(NaiveDateTime),
    /// Calendar year of `observed_at`
    Year(i32),
}

impl Predicate {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::Location(value) => {
                qb.push("location = ").push_bind(value.clone()).push(" COLLATE NOCASE");
            }
            Predicate::Category(value) => {
                qb.push("category = ").push_bind(value.clone()).push(" COLLATE NOCASE");
            }
            Predicate::ObservedFrom(ts) => {
                qb.push("observed_at >= ").push_bind(format_timestamp(ts));
            }
            Predicate::ObservedUntil(ts) => {
                qb.push("observed_at <= ").push_bind(format_timestamp(ts));
            }
            Predicate::Year(year) => {
                qb.push("strftime('%Y', observed_at) = ")
                    .push_bind(format!("{:04}", year));
            }
        }
    }
}

/// Conjunctive set of predicates; empty matches every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate caller parameters and build the matching predicates
    pub fn from_params(params: &FilterParams) -> Result<Self> {
        let mut set = Self::new();

        if let Some(location) = non_blank(&params.location) {
            set.push(Predicate::Location(location.to_string()));
        }
        if let Some(category) = non_blank(&params.category) {
            set.push(Predicate::Category(category.to_string()));
        }
        if let Some(start) = non_blank(&params.start_date) {
            let date = parse_date("start_date", start)?;
            set.push(Predicate::ObservedFrom(start_of_day(date)));
        }
        if let Some(end) = non_blank(&params.end_date) {
            let date = parse_date("end_date", end)?;
            set.push(Predicate::ObservedUntil(end_of_day(date)));
        }

        Ok(set)
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Add an endpoint-specific predicate
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Append ` WHERE p1 AND p2 ...`, or nothing when empty
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, predicate) in self.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(qb);
        }
    }
}

/// Parse an optional 4-digit year filter
pub fn parse_year(value: Option<&str>) -> Result<Option<i32>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(format!(
            "year must be a 4-digit year, got '{}'",
            value
        )));
    }

    value
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidInput(format!("year must be a 4-digit year, got '{}'", value)))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(location: Option<&str>, category: Option<&str>, start: Option<&str>, end: Option<&str>) -> FilterParams {
        FilterParams {
            location: location.map(String::from),
            category: category.map(String::from),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
        }
    }

    fn render(set: &PredicateSet) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM sightings");
        set.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_no_params_is_empty() {
        let set = PredicateSet::from_params(&FilterParams::default()).unwrap();
        assert!(set.is_empty());
        assert_eq!(render(&set), "SELECT * FROM sightings");
    }

    #[test]
    fn test_blank_params_are_ignored() {
        let set = PredicateSet::from_params(&params(Some(""), Some("  "), Some(""), None)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_date_bounds_cover_whole_days() {
        let set = PredicateSet::from_params(&params(None, None, Some("2024-03-01"), Some("2024-03-31"))).unwrap();
        let bounds: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            bounds,
            vec![
                Predicate::ObservedFrom(start_of_day(parse_date("d", "2024-03-01").unwrap())),
                Predicate::ObservedUntil(end_of_day(parse_date("d", "2024-03-31").unwrap())),
            ]
        );
    }

    #[test]
    fn test_values_are_bound_not_interpolated() {
        let set = PredicateSet::from_params(&params(Some("London'; DROP TABLE sightings; --"), Some("Tick"), None, None)).unwrap();
        let sql = render(&set);
        assert_eq!(
            sql,
            "SELECT * FROM sightings WHERE location = ? COLLATE NOCASE AND category = ? COLLATE NOCASE"
        );
        assert!(!sql.contains("DROP"));
    }

    #[test]
    fn test_endpoint_predicate_composes() {
        let set = PredicateSet::from_params(&params(None, Some("Tick"), None, None))
            .unwrap()
            .and(Predicate::Location("Leeds".into()))
            .and(Predicate::Year(2024));
        assert_eq!(
            render(&set),
            "SELECT * FROM sightings WHERE category = ? COLLATE NOCASE AND location = ? COLLATE NOCASE AND strftime('%Y', observed_at) = ?"
        );
    }

    #[test]
    fn test_malformed_date_rejected() {
        let err = PredicateSet::from_params(&params(None, None, None, Some("31-03-2024"))).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(None).unwrap(), None);
        assert_eq!(parse_year(Some("")).unwrap(), None);
        assert_eq!(parse_year(Some("2024")).unwrap(), Some(2024));
        assert!(parse_year(Some("24")).is_err());
        assert!(parse_year(Some("20x4")).is_err());
        assert!(parse_year(Some("+202")).is_err());
    }
}
