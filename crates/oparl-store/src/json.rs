//! Fetch and decode JSON collections
//!
//! Collections are arrays of records. A single malformed record is skipped
//! with a warning; a failed request or a non-array body yields an empty
//! result from the lenient loaders and an error from [`try_fetch_list`].

use crate::error::FetchError;
use crate::fetch::Fetcher;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

/// Fetch an array collection, propagating failures
///
/// # Errors
/// Returns the fetch error, or [`FetchError::Decode`] when the body is not
/// a JSON array.
pub async fn try_fetch_list<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    url: &str,
) -> Result<Vec<T>, FetchError> {
    let body = fetcher.fetch(url).await?;
    let value: Value = serde_json::from_slice(&body).map_err(|e| FetchError::decode(url, e))?;
    let Value::Array(items) = value else {
        return Err(FetchError::decode(url, "expected a JSON array"));
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(url, error = %e, "skipping malformed record");
                None
            }
        })
        .collect();

    debug!(url, total, decoded = decoded.len(), "decoded collection");
    Ok(decoded)
}

/// Fetch an array collection, degrading to empty on failure
///
/// Failures are logged with `label` and never surface to the caller.
pub async fn fetch_list<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    url: &str,
    label: &str,
) -> Vec<T> {
    match try_fetch_list(fetcher, url).await {
        Ok(items) => items,
        Err(e) => {
            error!(collection = label, error = %e, "failed to load collection");
            Vec::new()
        }
    }
}

/// Fetch a JSON object keyed by id, degrading to empty on failure
///
/// Entries whose value does not decode as `T` are skipped with a warning.
pub async fn fetch_record<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    url: &str,
    label: &str,
) -> IndexMap<String, T> {
    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            error!(collection = label, error = %e, "failed to load collection");
            return IndexMap::new();
        }
    };

    let entries = match serde_json::from_slice::<IndexMap<String, Value>>(&body) {
        Ok(entries) => entries,
        Err(e) => {
            error!(collection = label, url, error = %e, "expected a JSON object");
            return IndexMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(decoded) => Some((key, decoded)),
            Err(e) => {
                warn!(collection = label, key, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}
