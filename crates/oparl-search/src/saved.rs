//! Saved-search records and their normalization
//!
//! Queries are compared after collapsing whitespace and ignoring case. The
//! stored list is kept newest first, deduplicated and bounded.

use crate::storage::SearchStorage;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

/// Storage key of the saved-search list
pub const SAVED_SEARCHES_STORAGE_KEY: &str = "gemeinderatsradar.saved-searches";

/// Query parameter of the search results page
pub const SAVED_SEARCH_QUERY_PARAM: &str = "q";

/// Path of the search results page below the site base
pub const SAVED_SEARCH_RESULTS_PATH: &str = "suche";

/// Upper bound on stored searches
pub const MAX_SAVED_SEARCHES: usize = 25;

/// One saved query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    /// Normalized query text
    pub query: String,
    /// When the query was last saved
    #[serde(serialize_with = "serialize_timestamp")]
    pub saved_at: DateTime<Utc>,
}

impl SavedSearch {
    /// Create a search saved at `saved_at`
    pub fn new(query: impl Into<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            query: query.into(),
            saved_at,
        }
    }
}

fn serialize_timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Stored shape; timestamps are validated separately
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSearch {
    query: String,
    saved_at: String,
}

impl StoredSearch {
    fn into_saved(self) -> SavedSearch {
        let saved_at = DateTime::parse_from_rfc3339(&self.saved_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);
        SavedSearch::new(self.query, saved_at)
    }
}

/// Trim and collapse inner whitespace
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn comparable(query: &str) -> String {
    normalize_query(query).to_lowercase()
}

/// Whether two queries denote the same saved search
#[must_use]
pub fn is_same_query(left: &str, right: &str) -> bool {
    comparable(left) == comparable(right)
}

/// Whether `query` is among `searches`
#[must_use]
pub fn contains_query(searches: &[SavedSearch], query: &str) -> bool {
    searches.iter().any(|search| is_same_query(&search.query, query))
}

/// Normalize, drop empties, sort newest first, deduplicate, bound
#[must_use]
pub fn sanitize(searches: Vec<SavedSearch>) -> Vec<SavedSearch> {
    let mut normalized: Vec<SavedSearch> = searches
        .into_iter()
        .filter_map(|search| {
            let query = normalize_query(&search.query);
            (!query.is_empty()).then(|| SavedSearch::new(query, search.saved_at))
        })
        .collect();
    normalized.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

    let mut seen = HashSet::new();
    normalized
        .into_iter()
        .filter(|search| seen.insert(comparable(&search.query)))
        .take(MAX_SAVED_SEARCHES)
        .collect()
}

/// Save `query` as the newest entry, replacing an equivalent one
#[must_use]
pub fn upsert(searches: &[SavedSearch], query: &str, now: DateTime<Utc>) -> Vec<SavedSearch> {
    let query = normalize_query(query);
    if query.is_empty() {
        return sanitize(searches.to_vec());
    }

    let mut next = vec![SavedSearch::new(query.clone(), now)];
    next.extend(
        searches
            .iter()
            .filter(|search| !is_same_query(&search.query, &query))
            .cloned(),
    );
    sanitize(next)
}

/// Drop the entry equivalent to `query`
#[must_use]
pub fn remove(searches: &[SavedSearch], query: &str) -> Vec<SavedSearch> {
    let query = normalize_query(query);
    if query.is_empty() {
        return sanitize(searches.to_vec());
    }
    sanitize(
        searches
            .iter()
            .filter(|search| !is_same_query(&search.query, &query))
            .cloned()
            .collect(),
    )
}

/// Read the stored list; anything unreadable yields an empty list
pub fn read_saved_searches(storage: &dyn SearchStorage) -> Vec<SavedSearch> {
    let raw = match storage.get_item(SAVED_SEARCHES_STORAGE_KEY) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "cannot read saved searches");
            return Vec::new();
        }
    };

    let Ok(serde_json::Value::Array(items)) = serde_json::from_str(&raw) else {
        warn!("stored saved searches are not a list");
        return Vec::new();
    };
    sanitize(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<StoredSearch>(item).ok())
            .map(StoredSearch::into_saved)
            .collect(),
    )
}

/// Store the sanitized list; returns whether the write succeeded
pub fn write_saved_searches(storage: &dyn SearchStorage, searches: &[SavedSearch]) -> bool {
    let sanitized = sanitize(searches.to_vec());
    let encoded = match serde_json::to_string(&sanitized) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(error = %e, "cannot encode saved searches");
            return false;
        }
    };
    match storage.set_item(SAVED_SEARCHES_STORAGE_KEY, &encoded) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "cannot write saved searches");
            false
        }
    }
}

/// Results page URL for `query`
///
/// `base_url` may be absolute or a site-relative path; an empty query links
/// the bare results page.
#[must_use]
pub fn build_saved_search_url(base_url: &str, query: &str) -> String {
    let separator = if base_url.ends_with('/') { "" } else { "/" };
    let page = format!("{base_url}{separator}{SAVED_SEARCH_RESULTS_PATH}");
    let query = normalize_query(query);
    if query.is_empty() {
        return page;
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(SAVED_SEARCH_QUERY_PARAM, &query)
        .finish();
    format!("{page}?{encoded}")
}

/// Normalized query carried by a results page URL
#[must_use]
pub fn query_from_url(href: &str, param: &str) -> String {
    Url::parse(href)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == param)
                .map(|(_, value)| normalize_query(&value))
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_query("  Radweg \t Durlach\n"), "Radweg Durlach");
        assert!(is_same_query("radweg  DURLACH", " Radweg Durlach"));
        assert!(!is_same_query("Radweg", "Radwege"));
    }

    #[test]
    fn upsert_moves_equivalent_query_to_front() {
        let searches = vec![SavedSearch::new("Radweg", at(2)), SavedSearch::new("Schule", at(1))];
        let next = upsert(&searches, " schule ", at(3));

        let queries: Vec<_> = next.iter().map(|s| s.query.as_str()).collect();
        assert_eq!(queries, vec!["schule", "Radweg"]);
        assert_eq!(next[0].saved_at, at(3));
    }

    #[test]
    fn upsert_ignores_blank_queries() {
        let searches = vec![SavedSearch::new("Radweg", at(1))];
        assert_eq!(upsert(&searches, "   ", at(2)), searches);
    }

    #[test]
    fn sanitize_bounds_and_deduplicates() {
        let mut searches: Vec<_> = (0..30)
            .map(|i| SavedSearch::new(format!("Anfrage {i}"), at(i)))
            .collect();
        searches.push(SavedSearch::new("ANFRAGE 29", at(-5)));
        searches.push(SavedSearch::new("  ", at(100)));

        let sanitized = sanitize(searches);
        assert_eq!(sanitized.len(), MAX_SAVED_SEARCHES);
        assert_eq!(sanitized[0].query, "Anfrage 29");
        assert_eq!(sanitized[24].query, "Anfrage 5");
    }

    #[test]
    fn remove_is_case_insensitive() {
        let searches = vec![SavedSearch::new("Radweg", at(2)), SavedSearch::new("Schule", at(1))];
        let next = remove(&searches, "RADWEG");
        assert_eq!(next, vec![SavedSearch::new("Schule", at(1))]);
    }

    #[test]
    fn storage_round_trip_uses_iso_timestamps() {
        let storage = MemoryStorage::new();
        assert!(write_saved_searches(&storage, &[SavedSearch::new("Radweg", at(0))]));

        let raw = storage.get_item(SAVED_SEARCHES_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"[{"query":"Radweg","savedAt":"2023-11-14T22:13:20.000Z"}]"#);
        assert_eq!(read_saved_searches(&storage), vec![SavedSearch::new("Radweg", at(0))]);
    }

    #[test]
    fn unreadable_storage_reads_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(SAVED_SEARCHES_STORAGE_KEY, "{kaputt").unwrap();
        assert!(read_saved_searches(&storage).is_empty());

        storage.set_item(SAVED_SEARCHES_STORAGE_KEY, r#"{"query":"x"}"#).unwrap();
        assert!(read_saved_searches(&storage).is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped_and_bad_dates_become_epoch() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                SAVED_SEARCHES_STORAGE_KEY,
                r#"[{"query":"Radweg","savedAt":"gestern"},{"query":5},{"query":"Schule","savedAt":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();

        let searches = read_saved_searches(&storage);
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].query, "Schule");
        assert_eq!(searches[1].saved_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn results_url() {
        assert_eq!(build_saved_search_url("/", "Radweg Durlach"), "/suche?q=Radweg+Durlach");
        assert_eq!(
            build_saved_search_url("https://example.org/archiv", "a&b"),
            "https://example.org/archiv/suche?q=a%26b"
        );
        assert_eq!(build_saved_search_url("/archiv/", "  "), "/archiv/suche");
    }

    #[test]
    fn query_round_trips_through_url() {
        let href = build_saved_search_url("https://example.org/", "  Radweg   Durlach ");
        assert_eq!(query_from_url(&href, SAVED_SEARCH_QUERY_PARAM), "Radweg Durlach");
        assert_eq!(query_from_url("kein url", SAVED_SEARCH_QUERY_PARAM), "");
    }

    proptest! {
        #[test]
        fn sanitize_is_bounded_unique_and_idempotent(
            entries in proptest::collection::vec(("[ a-cA-C]{0,6}", 0i64..50), 0..40)
        ) {
            let searches: Vec<_> = entries
                .into_iter()
                .map(|(query, offset)| SavedSearch::new(query, at(offset)))
                .collect();
            let once = sanitize(searches);

            prop_assert!(once.len() <= MAX_SAVED_SEARCHES);
            prop_assert!(once.windows(2).all(|w| w[0].saved_at >= w[1].saved_at));
            let distinct: HashSet<_> = once.iter().map(|s| comparable(&s.query)).collect();
            prop_assert_eq!(distinct.len(), once.len());
            prop_assert_eq!(sanitize(once.clone()), once);
        }
    }
}
