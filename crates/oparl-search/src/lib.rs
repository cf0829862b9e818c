//! Saved searches for the council archive
//!
//! Users can bookmark full-text queries. This crate keeps the bookmark list
//! (normalized, deduplicated, bounded), models the save control and the
//! saved-searches page, and talks to the external search index through
//! [`SearchIndex`] for result counts.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐   ┌──────────────────┐
//! │ SavedSearchControl │   │ SavedSearchList  │
//! └─────────┬──────────┘   └───┬──────────┬───┘
//!           │                  │          │
//!           ▼                  ▼          ▼
//!     ┌───────────────────────────┐  ┌─────────────┐
//!     │ saved (pure list helpers) │  │ SearchIndex │
//!     └─────────────┬─────────────┘  └─────────────┘
//!                   ▼
//!            ┌───────────────┐
//!            │ SearchStorage │
//!            └───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod index;
pub mod list;
pub mod saved;
pub mod storage;

pub use control::{ControlStatus, SaveOutcome, SavedSearchControl, StatusKind};
pub use index::{
    is_search_enabled, local_index_exists, result_count, MemorySearchIndex, SearchAvailability,
    SearchError, SearchIndex, SKIP_SEARCH_ENV,
};
pub use list::{summary_text, CountBadge, EmptyReason, SavedSearchItem, SavedSearchList};
pub use saved::{
    build_saved_search_url, is_same_query, normalize_query, query_from_url, read_saved_searches,
    sanitize, upsert, write_saved_searches, SavedSearch, MAX_SAVED_SEARCHES,
    SAVED_SEARCHES_STORAGE_KEY, SAVED_SEARCH_QUERY_PARAM,
};
pub use storage::{FileStorage, MemoryStorage, SearchStorage, StorageError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
