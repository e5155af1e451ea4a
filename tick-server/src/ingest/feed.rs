//! External sighting feed client
//!
//! One GET per startup. Every failure mode maps to a [`FeedError`] so the
//! caller can log it and carry on with the data already stored.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tick_common::config::FeedConfig;

use super::record::{decode_records, RawSighting};

const USER_AGENT: &str = concat!("tick-tracker/", env!("CARGO_PKG_VERSION"));

/// Wrapper keys checked, in order, when the feed returns an object
const WRAPPER_KEYS: [&str; 2] = ["data", "sightings"];

/// Feed client errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// External feed client
pub struct FeedClient {
    http_client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the current feed contents
    pub async fn fetch(&self) -> Result<Vec<RawSighting>, FeedError> {
        tracing::debug!(url = %self.url, "Querying sighting feed");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(self.timeout)
            } else {
                FeedError::Parse(e.to_string())
            }
        })?;

        let records = decode_records(extract_records(payload)?);
        tracing::debug!(count = records.len(), "Decoded feed records");
        Ok(records)
    }

    fn classify(&self, err: reqwest::Error) -> FeedError {
        if err.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

/// Pull the record list out of a feed payload
///
/// Accepts a bare array, or an object wrapping the array under `data` or
/// `sightings`. The first wrapper key holding a non-empty array wins; an
/// object with neither yields no records.
pub fn extract_records(payload: Value) -> Result<Vec<Value>, FeedError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in WRAPPER_KEYS {
                if let Some(Value::Array(items)) = map.remove(key) {
                    if !items.is_empty() {
                        return Ok(items);
                    }
                }
            }
            Ok(Vec::new())
        }
        other => Err(FeedError::Parse(format!(
            "expected an array or object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let items = extract_records(json!([{"id": "1"}, {"id": "2"}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_data_wrapper() {
        let items = extract_records(json!({"data": [{"id": "1"}]})).unwrap();
        assert_eq!(items, vec![json!({"id": "1"})]);
    }

    #[test]
    fn test_sightings_wrapper() {
        let items = extract_records(json!({"sightings": [{"id": "1"}], "count": 1})).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_data_preferred_over_sightings() {
        let items = extract_records(json!({
            "sightings": [{"id": "s"}],
            "data": [{"id": "d"}]
        }))
        .unwrap();
        assert_eq!(items, vec![json!({"id": "d"})]);
    }

    #[test]
    fn test_empty_data_falls_through() {
        let items = extract_records(json!({"data": [], "sightings": [{"id": "s"}]})).unwrap();
        assert_eq!(items, vec![json!({"id": "s"})]);
    }

    #[test]
    fn test_object_without_wrapper_is_empty() {
        assert!(extract_records(json!({"status": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_payload_rejected() {
        assert!(matches!(extract_records(json!("nope")), Err(FeedError::Parse(_))));
        assert!(matches!(extract_records(Value::Null), Err(FeedError::Parse(_))));
    }
}
