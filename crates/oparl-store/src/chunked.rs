//! File contents with text merged from numbered chunk files
//!
//! `file-contents.json` carries the metadata for every file. The extracted
//! text is published separately as `file-contents-chunks/chunk-0.json`,
//! `chunk-1.json`, ... up to an unknown count; the first missing chunk ends
//! the series.
//!
//! Chunks are requested in windows of [`ChunkLoading::batch_size`] concurrent
//! fetches and merged in index order. A not-found chunk ends the series.
//! Any other failure skips only that chunk and leaves the series incomplete
//! so that a later [`ChunkedContentStore::preload_all_contents`] can retry.

use crate::entity_store::{EntityMap, EntityStore};
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::json::try_fetch_list;
use crate::source::{Collection, DataSource};
use futures::future::join_all;
use oparl_model::{ChunkRecord, FileContent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument, warn};

/// Default number of chunks requested concurrently
pub const DEFAULT_CHUNK_BATCH_SIZE: usize = 50;

/// How chunk files are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLoading {
    /// Chunks requested concurrently per window (values below 1 act as 1)
    pub batch_size: usize,
    /// Stop after this many chunks even without a not-found
    pub max_chunks: Option<usize>,
}

impl ChunkLoading {
    /// One chunk at a time
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            batch_size: 1,
            max_chunks: None,
        }
    }

    /// Set batch size
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set chunk limit
    #[must_use]
    pub const fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }
}

impl Default for ChunkLoading {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_CHUNK_BATCH_SIZE,
            max_chunks: None,
        }
    }
}

/// How a chunk-loading attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Chunk `at` does not exist; every earlier chunk was merged
    Exhausted {
        /// Index of the first missing chunk
        at: usize,
    },
    /// The configured chunk limit was reached
    LimitReached,
    /// Chunk `at` was the first to fail; every other chunk before the end
    /// of the series was merged
    Failed {
        /// Index of the failed chunk
        at: usize,
    },
    /// An earlier attempt already merged the whole series
    AlreadyComplete,
}

/// Summary of one chunk-loading attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLoadReport {
    /// Chunks merged by this attempt
    pub chunks_loaded: usize,
    /// Records whose text was filled by this attempt
    pub texts_merged: usize,
    /// Why the attempt stopped
    pub outcome: ChunkOutcome,
}

impl ChunkLoadReport {
    fn already_complete() -> Self {
        Self {
            chunks_loaded: 0,
            texts_merged: 0,
            outcome: ChunkOutcome::AlreadyComplete,
        }
    }

    /// Whether the chunk series is fully merged after this attempt
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !matches!(self.outcome, ChunkOutcome::Failed { .. })
    }
}

/// File-content metadata with chunked text
#[derive(Debug)]
pub struct ChunkedContentStore {
    metadata: EntityStore<FileContent>,
    fetcher: Arc<dyn Fetcher>,
    source: DataSource,
    loading: ChunkLoading,
    first_attempt: OnceCell<ChunkLoadReport>,
    complete: AtomicBool,
    load_lock: Mutex<()>,
}

impl ChunkedContentStore {
    /// Create store reading `file-contents.json` and its chunks from `source`
    pub fn new(source: DataSource, fetcher: Arc<dyn Fetcher>, loading: ChunkLoading) -> Self {
        let metadata = EntityStore::new(
            Collection::FileContents.label(),
            source.url(Collection::FileContents),
            Arc::clone(&fetcher),
        );
        Self {
            metadata,
            fetcher,
            source,
            loading,
            first_attempt: OnceCell::new(),
            complete: AtomicBool::new(false),
            load_lock: Mutex::new(()),
        }
    }

    /// Chunk-loading policy
    #[must_use]
    pub fn loading(&self) -> ChunkLoading {
        self.loading
    }

    /// Whether every chunk has been merged
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// All records keyed by file id
    ///
    /// The first call loads metadata and runs one chunk-loading attempt.
    pub async fn entries(&self) -> Arc<EntityMap<FileContent>> {
        self.first_attempt().await;
        self.metadata.entries().await
    }

    /// Record for file `id`
    pub async fn get(&self, id: &str) -> Option<Arc<FileContent>> {
        self.entries().await.get(id).cloned()
    }

    /// All records in source order
    pub async fn get_all(&self) -> Vec<Arc<FileContent>> {
        self.entries().await.values().cloned().collect()
    }

    /// Make sure all chunk text is merged
    ///
    /// Runs the first attempt if none has happened, retries when an earlier
    /// attempt failed, and is a no-op once the series is complete.
    pub async fn preload_all_contents(&self) -> ChunkLoadReport {
        if !self.first_attempt.initialized() {
            return *self.first_attempt().await;
        }
        if self.is_complete() {
            return ChunkLoadReport::already_complete();
        }

        let _guard = self.load_lock.lock().await;
        if self.is_complete() {
            return ChunkLoadReport::already_complete();
        }
        self.load_chunks().await
    }

    async fn first_attempt(&self) -> &ChunkLoadReport {
        self.first_attempt
            .get_or_init(|| async {
                let _guard = self.load_lock.lock().await;
                self.load_chunks().await
            })
            .await
    }

    #[instrument(skip(self), fields(batch_size = self.loading.batch_size))]
    async fn load_chunks(&self) -> ChunkLoadReport {
        let records = self.metadata.entries().await;
        let batch_size = self.loading.batch_size.max(1);

        let mut chunks_loaded = 0;
        let mut texts_merged = 0;
        let mut first_failure: Option<usize> = None;
        let mut start = 0;

        let end_of_series = loop {
            let end = match self.loading.max_chunks {
                Some(max) => (start + batch_size).min(max),
                None => start + batch_size,
            };
            if start >= end {
                break None;
            }

            let results = join_all((start..end).map(|index| self.fetch_chunk(index))).await;
            let mut missing = None;
            for (index, result) in (start..end).zip(results) {
                match result {
                    Ok(chunk) => {
                        chunks_loaded += 1;
                        texts_merged += merge_chunk(&records, &chunk);
                    }
                    Err(e) if e.is_not_found() => {
                        debug!(index, "end of chunk series");
                        missing = Some(index);
                        break;
                    }
                    Err(e) => {
                        warn!(index, error = %e, "chunk failed, skipped");
                        first_failure.get_or_insert(index);
                    }
                }
            }
            if missing.is_some() {
                break missing;
            }
            start = end;
        };

        let outcome = match (first_failure, end_of_series) {
            (Some(at), _) => ChunkOutcome::Failed { at },
            (None, Some(at)) => ChunkOutcome::Exhausted { at },
            (None, None) => ChunkOutcome::LimitReached,
        };
        let report = ChunkLoadReport {
            chunks_loaded,
            texts_merged,
            outcome,
        };
        if report.is_complete() {
            self.complete.store(true, Ordering::Release);
        }
        info!(chunks_loaded, texts_merged, ?outcome, "file content chunks merged");
        report
    }

    async fn fetch_chunk(&self, index: usize) -> Result<Vec<ChunkRecord>, FetchError> {
        try_fetch_list(self.fetcher.as_ref(), &self.source.chunk_url(index)).await
    }
}

fn merge_chunk(records: &EntityMap<FileContent>, chunk: &[ChunkRecord]) -> usize {
    chunk
        .iter()
        .filter(|entry| {
            records
                .get(&entry.id)
                .is_some_and(|record| record.merge_chunk_text(&entry.extracted_text))
        })
        .count()
}
