//! Saved-searches page model

use crate::index::{result_count, SearchIndex};
use crate::saved::{self, build_saved_search_url, read_saved_searches, write_saved_searches, SavedSearch};
use crate::storage::SearchStorage;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Confirmation prompt before clearing the list
pub const CLEAR_CONFIRMATION_TEXT: &str =
    "Sollen wirklich alle gespeicherten Suchen gelöscht werden?";

/// Link caption back to the search page
pub const SEARCH_LINK_TEXT: &str = "Zur Suche";

/// Why the list is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Nothing saved yet
    NothingSaved,
    /// The user just cleared everything
    Cleared,
    /// No storage
    Unavailable,
}

impl EmptyReason {
    /// Message shown in place of the list
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NothingSaved => "Noch keine Suche gespeichert.",
            Self::Cleared => "Alle gespeicherten Suchen wurden gelöscht.",
            Self::Unavailable => "Gespeicherte Suchen sind hier nicht verfügbar.",
        }
    }

    /// Whether a link back to the search page accompanies the message
    #[must_use]
    pub fn links_to_search(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Result count badge of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBadge {
    /// Lookup succeeded
    Count(usize),
    /// Lookup failed or search is disabled
    Unavailable,
}

impl CountBadge {
    /// Accessible description
    #[must_use]
    pub fn aria_label(self) -> String {
        match self {
            Self::Count(n) => format!("{n} Treffer"),
            Self::Unavailable => "Treffer nicht verfügbar".to_string(),
        }
    }
}

impl fmt::Display for CountBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n} Treffer"),
            Self::Unavailable => f.write_str("\u{2013}"),
        }
    }
}

/// One rendered entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSearchItem {
    /// Normalized query
    pub query: String,
    /// Results page link
    pub href: String,
    /// Accessible caption of the remove button
    pub remove_label: String,
}

/// Summary line above the list
#[must_use]
pub fn summary_text(count: usize) -> String {
    let noun = if count == 1 { "Suchanfrage" } else { "Suchanfragen" };
    format!("{} gespeicherte {noun}", group_thousands(count))
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

/// State of the saved-searches page
pub struct SavedSearchList {
    storage: Option<Arc<dyn SearchStorage>>,
    base_url: String,
    search_enabled: bool,
    searches: Vec<SavedSearch>,
    cleared: bool,
}

impl SavedSearchList {
    /// Load the stored list
    #[must_use]
    pub fn open(
        storage: Option<Arc<dyn SearchStorage>>,
        base_url: impl Into<String>,
        search_enabled: bool,
    ) -> Self {
        let searches = storage
            .as_deref()
            .map(|storage| read_saved_searches(storage))
            .unwrap_or_default();
        Self {
            storage,
            base_url: base_url.into(),
            search_enabled,
            searches,
            cleared: false,
        }
    }

    /// Saved searches, newest first
    #[must_use]
    pub fn searches(&self) -> &[SavedSearch] {
        &self.searches
    }

    /// Why nothing is listed, `None` when entries exist
    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if self.storage.is_none() {
            Some(EmptyReason::Unavailable)
        } else if !self.searches.is_empty() {
            None
        } else if self.cleared {
            Some(EmptyReason::Cleared)
        } else {
            Some(EmptyReason::NothingSaved)
        }
    }

    /// Summary line; counts zero while empty
    #[must_use]
    pub fn summary(&self) -> String {
        summary_text(self.searches.len())
    }

    /// Whether the clear-all button is enabled
    #[must_use]
    pub fn can_clear(&self) -> bool {
        self.storage.is_some() && !self.searches.is_empty()
    }

    /// Link target of the empty-state message
    #[must_use]
    pub fn search_page_href(&self) -> &str {
        &self.base_url
    }

    /// Entries with links to their results pages
    #[must_use]
    pub fn items(&self) -> Vec<SavedSearchItem> {
        self.searches
            .iter()
            .map(|search| SavedSearchItem {
                query: search.query.clone(),
                href: build_saved_search_url(&self.base_url, &search.query),
                remove_label: format!("Suche \"{}\" entfernen", search.query),
            })
            .collect()
    }

    /// Remove one entry; returns whether the list changed
    ///
    /// A failed write leaves the list untouched.
    pub fn remove(&mut self, query: &str) -> bool {
        let Some(storage) = self.storage.as_deref() else {
            return false;
        };
        let next = saved::remove(&self.searches, query);
        if next.len() == self.searches.len() {
            return false;
        }
        if !write_saved_searches(storage, &next) {
            warn!(query, "removing saved search failed");
            return false;
        }
        self.searches = next;
        true
    }

    /// Remove every entry after the user confirmed
    pub fn clear(&mut self, confirmed: bool) -> bool {
        let Some(storage) = self.storage.as_deref() else {
            return false;
        };
        if self.searches.is_empty() || !confirmed {
            return false;
        }
        if !write_saved_searches(storage, &[]) {
            warn!("clearing saved searches failed");
            return false;
        }
        self.searches.clear();
        self.cleared = true;
        true
    }

    /// Result counts per entry, looked up concurrently
    ///
    /// Every entry gets a badge; failures only affect their own entry.
    pub async fn result_counts(&self, index: &dyn SearchIndex) -> Vec<CountBadge> {
        if !self.search_enabled {
            return vec![CountBadge::Unavailable; self.searches.len()];
        }
        let lookups = self
            .searches
            .iter()
            .map(|search| result_count(index, &search.query));
        join_all(lookups)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(count) => CountBadge::Count(count),
                Err(e) => {
                    debug!(error = %e, "result count unavailable");
                    CountBadge::Unavailable
                }
            })
            .collect()
    }
}
