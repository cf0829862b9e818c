//! OParl Archive Store
//!
//! Keyed caches over the remote JSON collections of the archive.
//!
//! # Core Concepts
//!
//! - [`Fetcher`]: The seam to the remote data source (HTTP, local mirror, memory)
//! - [`EntityStore`]: One collection, fetched once on first access, keyed by id
//! - [`ChunkedContentStore`]: File-content metadata plus extracted text merged
//!   from numbered chunk files
//!
//! # Architecture
//!
//! ```text
//! Fetcher ──► fetch_list ──► EntityStore<T> ──► Arc<EntityMap<T>>
//!    │                            ▲
//!    └──► chunk-<n>.json ──► ChunkedContentStore (text merged into records)
//! ```
//!
//! Every store initializes at most once. Concurrent callers share the single
//! in-flight fetch, and failures degrade to an empty collection instead of an
//! error.
//!
//! # Example
//!
//! ```rust,ignore
//! use oparl_store::{DataSource, EntityStore, HttpFetcher, Collection};
//! use oparl_model::Meeting;
//!
//! let source = DataSource::new("https://example.org/docs");
//! let fetcher = Arc::new(HttpFetcher::new());
//! let meetings = EntityStore::<Meeting>::new("meetings", source.url(Collection::Meetings), fetcher);
//!
//! if let Some(meeting) = meetings.get("https://example.org/oparl/meeting/1").await {
//!     println!("{}", meeting.name);
//! }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod chunked;
pub mod entity_store;
pub mod error;
pub mod fetch;
pub mod json;
pub mod source;

// Re-exports for convenience
pub use chunked::{
    ChunkLoadReport, ChunkLoading, ChunkOutcome, ChunkedContentStore, DEFAULT_CHUNK_BATCH_SIZE,
};
pub use entity_store::{EntityMap, EntityStore};
pub use error::FetchError;
pub use fetch::{Fetcher, FsFetcher, HttpFetcher, MemoryFetcher};
pub use json::{fetch_list, fetch_record, try_fetch_list};
pub use source::{Collection, DataSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
