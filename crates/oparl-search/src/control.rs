//! Save button next to the search box
//!
//! Holds the current query, the stored list, and the status line. Info
//! statuses expire after [`STATUS_AUTO_DISMISS_SECS`]; errors stay until the query
//! changes.

use crate::saved::{
    contains_query, normalize_query, read_saved_searches, upsert, write_saved_searches,
    SavedSearch,
};
use crate::storage::SearchStorage;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lifetime of an info status, in seconds
pub const STATUS_AUTO_DISMISS_SECS: i64 = 4;

/// Status shown when no storage is available
pub const STORAGE_UNAVAILABLE_TEXT: &str = "Speichern ist in diesem Browser nicht verfügbar.";

/// Status shown when writing failed
pub const SAVE_FAILED_TEXT: &str = "Suche konnte nicht gespeichert werden.";

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Confirmation
    Info,
    /// Failure
    Error,
}

/// Status line content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStatus {
    /// Severity
    pub kind: StatusKind,
    /// Message
    pub text: String,
    expires_at: Option<DateTime<Utc>>,
}

impl ControlStatus {
    fn info(text: String, now: DateTime<Utc>) -> Self {
        Self {
            kind: StatusKind::Info,
            text,
            expires_at: Some(now + TimeDelta::seconds(STATUS_AUTO_DISMISS_SECS)),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            expires_at: None,
        }
    }
}

/// Result of pressing the save button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new entry was stored
    Saved(String),
    /// An equivalent entry was refreshed
    Updated(String),
    /// Nothing to save
    Ignored,
    /// Writing failed; the list is unchanged
    Failed,
}

/// Save-search control state
pub struct SavedSearchControl {
    storage: Option<Arc<dyn SearchStorage>>,
    searches: Vec<SavedSearch>,
    query: String,
    status: Option<ControlStatus>,
}

impl SavedSearchControl {
    /// Load the stored list; `None` storage disables the control
    #[must_use]
    pub fn new(storage: Option<Arc<dyn SearchStorage>>) -> Self {
        let (searches, status) = match &storage {
            Some(storage) => (read_saved_searches(storage.as_ref()), None),
            None => (Vec::new(), Some(ControlStatus::error(STORAGE_UNAVAILABLE_TEXT))),
        };
        Self {
            storage,
            searches,
            query: String::new(),
            status,
        }
    }

    /// Whether saving is possible at all
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    /// Track the search box content; clears the status line
    pub fn set_query(&mut self, raw: &str) {
        self.query = normalize_query(raw);
        if self.is_available() {
            self.status = None;
        }
    }

    /// Normalized current query
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Known saved searches, newest first
    #[must_use]
    pub fn searches(&self) -> &[SavedSearch] {
        &self.searches
    }

    /// Whether the save button accepts clicks
    #[must_use]
    pub fn button_enabled(&self) -> bool {
        self.is_available() && !self.query.is_empty()
    }

    /// Save button caption
    #[must_use]
    pub fn button_label(&self) -> &'static str {
        if !self.query.is_empty() && contains_query(&self.searches, &self.query) {
            "Suche aktualisieren"
        } else {
            "Suche speichern"
        }
    }

    /// Caption of the link to the saved-search page
    #[must_use]
    pub fn link_label(&self) -> String {
        match self.searches.len() {
            0 => "Gespeicherte Suchen".to_string(),
            n => format!("Gespeicherte Suchen ({n})"),
        }
    }

    /// Status line at `now`, with expired info statuses hidden
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> Option<&ControlStatus> {
        self.status
            .as_ref()
            .filter(|status| status.expires_at.map_or(true, |expires| now < expires))
    }

    /// Save the current query at `now`
    ///
    /// The list is re-read first so entries saved in another window are kept.
    pub fn save(&mut self, now: DateTime<Utc>) -> SaveOutcome {
        let Some(storage) = self.storage.clone() else {
            return SaveOutcome::Ignored;
        };
        if self.query.is_empty() {
            return SaveOutcome::Ignored;
        }

        self.searches = read_saved_searches(storage.as_ref());
        let already_saved = contains_query(&self.searches, &self.query);
        let updated = upsert(&self.searches, &self.query, now);
        if !write_saved_searches(storage.as_ref(), &updated) {
            warn!(query = %self.query, "saving search failed");
            self.status = Some(ControlStatus::error(SAVE_FAILED_TEXT));
            return SaveOutcome::Failed;
        }

        self.searches = updated;
        let query = self.query.clone();
        debug!(%query, already_saved, "search saved");
        if already_saved {
            self.status = Some(ControlStatus::info(format!("Suche aktualisiert: \"{query}\""), now));
            SaveOutcome::Updated(query)
        } else {
            self.status = Some(ControlStatus::info(format!("Suche gespeichert: \"{query}\""), now));
            SaveOutcome::Saved(query)
        }
    }
}
