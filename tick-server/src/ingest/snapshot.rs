//! Bootstrap snapshot file

use serde_json::Value;
use std::path::Path;
use tick_common::{Error, Result};

use super::record::{decode_records, RawSighting};

/// Read the bootstrap snapshot, a JSON array of flat records
///
/// Returns `Ok(None)` when the file does not exist.
pub async fn read_snapshot(path: &Path) -> Result<Option<Vec<RawSighting>>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Array(items) => Ok(Some(decode_records(items))),
        _ => Err(Error::InvalidInput(format!(
            "snapshot {} is not a JSON array",
            path.display()
        ))),
    }
}
