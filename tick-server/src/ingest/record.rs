//! Raw sighting records from the bootstrap snapshot and the external feed
//!
//! Both sources share one flat shape. Field values are usually strings but
//! numbers are accepted too; anything else counts as absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tick_common::db::{NewSighting, SourceLabel};
use tick_common::time::normalize_timestamp;
use tick_common::CityTable;
use tracing::debug;

/// One snapshot/feed entry before validation
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSighting {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub species: Option<String>,

    /// Fallback for `species`
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,

    #[serde(default, rename = "latinName", deserialize_with = "lenient_string")]
    pub latin_name: Option<String>,

    /// Fallback for `latinName`
    #[serde(default, rename = "latin_name", deserialize_with = "lenient_string")]
    pub latin_name_snake: Option<String>,
}

impl RawSighting {
    /// Validate and normalize into a storable sighting
    ///
    /// Returns `None` when `id`, `date` or `location` is missing, or when the
    /// date cannot be read as a timestamp.
    pub fn to_new_sighting(&self, cities: &CityTable, source: SourceLabel) -> Option<NewSighting> {
        let id = self.id.as_deref()?;
        let location = self.location.as_deref()?.trim();
        let observed_at = normalize_timestamp(self.date.as_deref()?)?;

        Some(NewSighting::new(
            id,
            observed_at,
            location,
            self.species
                .as_deref()
                .or(self.category.as_deref())
                .map(|s| s.trim().to_string()),
            self.latin_name.clone().or_else(|| self.latin_name_snake.clone()),
            cities,
            source,
        ))
    }
}

/// Decode a JSON array of records, dropping entries that are not objects
pub fn decode_records(values: Vec<Value>) -> Vec<RawSighting> {
    let total = values.len();
    let records: Vec<RawSighting> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if records.len() < total {
        debug!(dropped = total - records.len(), "Skipped undecodable records");
    }
    records
}

/// Accept strings and numbers, treating blanks and other JSON types as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(text.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSighting {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_record() {
        let r = raw(json!({
            "id": "abc",
            "date": "2024-03-01 10:00:00",
            "location": "London",
            "species": "Marsh tick",
            "latinName": "Ixodes apronophorus"
        }));
        let s = r.to_new_sighting(&CityTable::uk_defaults(), SourceLabel::System).unwrap();
        assert_eq!(s.id, "abc");
        assert_eq!(s.observed_at_text(), "2024-03-01T10:00:00");
        assert_eq!(s.category, "Marsh tick");
        assert_eq!(s.category_detail, "Ixodes apronophorus");
        assert_eq!(s.lat, Some(51.5074));
    }

    #[test]
    fn test_numeric_id_accepted() {
        let r = raw(json!({"id": 42, "date": "2024-03-01", "location": "Leeds"}));
        assert_eq!(r.id.as_deref(), Some("42"));
        assert!(r.to_new_sighting(&CityTable::uk_defaults(), SourceLabel::System).is_some());
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let cities = CityTable::uk_defaults();
        for value in [
            json!({"date": "2024-03-01", "location": "Leeds"}),
            json!({"id": "x", "location": "Leeds"}),
            json!({"id": "x", "date": "2024-03-01"}),
            json!({"id": "", "date": "2024-03-01", "location": "Leeds"}),
            json!({"id": "x", "date": "2024-03-01", "location": "   "}),
            json!({"id": "x", "date": "not a date", "location": "Leeds"}),
            json!({"id": null, "date": "2024-03-01", "location": "Leeds"}),
        ] {
            assert!(raw(value.clone()).to_new_sighting(&cities, SourceLabel::System).is_none(), "{}", value);
        }
    }

    #[test]
    fn test_optional_fields_default() {
        let r = raw(json!({"id": "y", "date": "2024-03-01T12:00:00Z", "location": "Atlantis"}));
        let s = r.to_new_sighting(&CityTable::uk_defaults(), SourceLabel::ExternalFeed).unwrap();
        assert_eq!(s.category, "Unknown");
        assert_eq!(s.category_detail, "");
        assert_eq!((s.lat, s.lng), (None, None));
        assert_eq!(s.source_label, SourceLabel::ExternalFeed);
    }

    #[test]
    fn test_both_spellings_present() {
        let records = decode_records(vec![json!({
            "id": "d1",
            "date": "2024-03-01",
            "location": "London",
            "species": "Tick",
            "category": "Mite",
            "latinName": "Ixodes ricinus",
            "latin_name": "Other"
        })]);
        assert_eq!(records.len(), 1);

        let s = records[0].to_new_sighting(&CityTable::uk_defaults(), SourceLabel::System).unwrap();
        assert_eq!(s.category, "Tick");
        assert_eq!(s.category_detail, "Ixodes ricinus");
    }

    #[test]
    fn test_fallback_spellings() {
        let r = raw(json!({
            "id": "d2",
            "date": "2024-03-01",
            "location": "Leeds",
            "category": "Deer tick",
            "latin_name": "Ixodes scapularis"
        }));
        let s = r.to_new_sighting(&CityTable::uk_defaults(), SourceLabel::System).unwrap();
        assert_eq!(s.category, "Deer tick");
        assert_eq!(s.category_detail, "Ixodes scapularis");
    }

    #[test]
    fn test_decode_drops_non_objects() {
        let records = decode_records(vec![
            json!({"id": "1", "date": "2024-01-01", "location": "Leeds"}),
            json!("garbage"),
            json!(17),
            json!({"id": "2"}),
        ]);
        assert_eq!(records.len(), 2);
    }
}
