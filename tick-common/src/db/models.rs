//! Database models

use crate::cities::CityTable;
use crate::time::format_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Category stored when a record does not name one
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Where a sighting came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceLabel {
    /// Bootstrap snapshot (the default)
    #[default]
    System,
    /// External sighting feed
    ExternalFeed,
    /// Direct submission, tagged with the reporter's name
    Reporter(String),
}

impl SourceLabel {
    pub fn as_str(&self) -> &str {
        match self {
            SourceLabel::System => "System",
            SourceLabel::ExternalFeed => "API",
            SourceLabel::Reporter(name) => name,
        }
    }
}

/// A stored sighting as returned to API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sighting {
    pub id: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub observed_at: String,
    pub location: String,
    pub category: String,
    pub category_detail: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub attachment_ref: Option<String>,
    pub source_label: String,
}

/// A validated sighting ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewSighting {
    pub id: String,
    pub observed_at: NaiveDateTime,
    pub location: String,
    pub category: String,
    pub category_detail: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub attachment_ref: Option<String>,
    pub source_label: SourceLabel,
}

impl NewSighting {
    /// Build a sighting, resolving coordinates from the current city table
    ///
    /// Blank categories fall back to [`UNKNOWN_CATEGORY`].
    pub fn new(
        id: impl Into<String>,
        observed_at: NaiveDateTime,
        location: impl Into<String>,
        category: Option<String>,
        category_detail: Option<String>,
        cities: &CityTable,
        source_label: SourceLabel,
    ) -> Self {
        let location = location.into();
        let (lat, lng) = match cities.coordinates(&location) {
            Some((lat, lng)) => (Some(lat), Some(lng)),
            None => (None, None),
        };

        Self {
            id: id.into(),
            observed_at,
            location,
            category: category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            category_detail: category_detail.unwrap_or_default(),
            lat,
            lng,
            attachment_ref: None,
            source_label,
        }
    }

    pub fn with_attachment(mut self, attachment_ref: Option<String>) -> Self {
        self.attachment_ref = attachment_ref;
        self
    }

    /// `observed_at` in storage format
    pub fn observed_at_text(&self) -> String {
        format_timestamp(&self.observed_at)
    }
}
