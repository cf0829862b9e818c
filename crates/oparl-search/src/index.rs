//! Seam to the external full-text search subsystem
//!
//! The index itself is built elsewhere; this crate only asks it for result
//! counts and decides whether search is offered at all.

use crate::saved::normalize_query;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Environment variable that disables search in quick builds
pub const SKIP_SEARCH_ENV: &str = "SKIP_PAGEFIND";

/// Index bundle location below the site output directory
pub const LOCAL_INDEX_ENTRY: &str = "pagefind/pagefind.js";

/// Shown when a quick build skipped the index
pub const DISABLED_BY_ENV_MESSAGE: &str =
    "Suche ist in diesem schnellen Build deaktiviert (SKIP_PAGEFIND=1).";

/// Shown on the dev server when no index was built
pub const DISABLED_IN_DEV_MESSAGE: &str =
    "Suche ist im Dev-Server deaktiviert, weil kein lokaler Pagefind-Index gefunden wurde.";

/// Search failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Search is switched off
    #[error("search is disabled")]
    Disabled,

    /// The index could not answer
    #[error("search for {query:?} failed: {message}")]
    Failed {
        /// Normalized query
        query: String,
        /// Failure description
        message: String,
    },
}

/// External full-text index
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Number of results for a non-empty, normalized query
    async fn count(&self, query: &str) -> Result<usize, SearchError>;
}

/// Result count for `query`; empty queries count zero without asking
pub async fn result_count(index: &dyn SearchIndex, query: &str) -> Result<usize, SearchError> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Ok(0);
    }
    index.count(&query).await
}

/// Index with preset answers
#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    counts: HashMap<String, usize>,
    failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl MemorySearchIndex {
    /// Create index that counts zero for everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `count` for `query` (matched case-insensitively)
    #[must_use]
    pub fn with_count(mut self, query: &str, count: usize) -> Self {
        self.counts.insert(key(query), count);
        self
    }

    /// Fail for `query`
    #[must_use]
    pub fn with_failure(mut self, query: &str) -> Self {
        self.failing.insert(key(query));
        self
    }

    /// Queries asked so far
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

fn key(query: &str) -> String {
    normalize_query(query).to_lowercase()
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn count(&self, query: &str) -> Result<usize, SearchError> {
        self.requests.lock().push(query.to_string());
        let key = key(query);
        if self.failing.contains(&key) {
            return Err(SearchError::Failed {
                query: query.to_string(),
                message: "index unavailable".to_string(),
            });
        }
        Ok(self.counts.get(&key).copied().unwrap_or(0))
    }
}

/// Whether the skip switch leaves search enabled
///
/// `1`, `true` and `yes` (any case, surrounding whitespace ignored) disable.
#[must_use]
pub fn is_search_enabled(skip_value: Option<&str>) -> bool {
    let skip = skip_value.unwrap_or_default().trim().to_lowercase();
    !matches!(skip.as_str(), "1" | "true" | "yes")
}

/// Whether a built index exists below `output_dir`
#[must_use]
pub fn local_index_exists(output_dir: &Path) -> bool {
    output_dir.join(LOCAL_INDEX_ENTRY).is_file()
}

/// Resolved availability of search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAvailability {
    /// Search may be offered
    pub enabled: bool,
    /// The skip switch was not set
    pub enabled_by_env: bool,
    /// Running on the dev server
    pub is_dev: bool,
    /// A built index was found
    pub has_local_index: bool,
    /// Message to show instead of results
    pub disabled_message: Option<&'static str>,
}

impl SearchAvailability {
    /// Combine the skip switch, dev mode and local index presence
    ///
    /// On the dev server search additionally requires a local index.
    #[must_use]
    pub fn resolve(skip_value: Option<&str>, is_dev: bool, has_local_index: bool) -> Self {
        let enabled_by_env = is_search_enabled(skip_value);
        let enabled = enabled_by_env && (!is_dev || has_local_index);
        let disabled_message = if !enabled_by_env {
            Some(DISABLED_BY_ENV_MESSAGE)
        } else if !enabled {
            Some(DISABLED_IN_DEV_MESSAGE)
        } else {
            None
        };
        Self {
            enabled,
            enabled_by_env,
            is_dev,
            has_local_index,
            disabled_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_switch_values() {
        assert!(is_search_enabled(None));
        assert!(is_search_enabled(Some("0")));
        assert!(is_search_enabled(Some("nein")));
        assert!(!is_search_enabled(Some(" TRUE ")));
        assert!(!is_search_enabled(Some("yes")));
        assert!(!is_search_enabled(Some("1")));
    }

    #[test]
    fn availability_matrix() {
        let production = SearchAvailability::resolve(None, false, false);
        assert!(production.enabled);
        assert_eq!(production.disabled_message, None);

        let skipped = SearchAvailability::resolve(Some("1"), false, true);
        assert!(!skipped.enabled);
        assert_eq!(skipped.disabled_message, Some(DISABLED_BY_ENV_MESSAGE));

        let dev_without_index = SearchAvailability::resolve(None, true, false);
        assert!(!dev_without_index.enabled);
        assert_eq!(dev_without_index.disabled_message, Some(DISABLED_IN_DEV_MESSAGE));

        assert!(SearchAvailability::resolve(None, true, true).enabled);
    }

    #[test]
    fn local_index_detection() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!local_index_exists(dir.path()));

        std::fs::create_dir_all(dir.path().join("pagefind")).unwrap();
        std::fs::write(dir.path().join(LOCAL_INDEX_ENTRY), "").unwrap();
        assert!(local_index_exists(dir.path()));
    }

    #[tokio::test]
    async fn empty_queries_are_not_sent() {
        let index = MemorySearchIndex::new().with_count("radweg", 3);

        assert_eq!(result_count(&index, "   ").await, Ok(0));
        assert_eq!(result_count(&index, " Radweg ").await, Ok(3));
        assert_eq!(index.requests(), vec!["Radweg".to_string()]);
    }
}
