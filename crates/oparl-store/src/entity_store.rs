//! Lazily initialized, keyed entity collections
//!
//! An [`EntityStore`] fetches its collection on first access and keeps the
//! resulting map for the lifetime of the store. Concurrent first accesses
//! share one in-flight fetch.

use crate::fetch::Fetcher;
use crate::json::fetch_list;
use indexmap::IndexMap;
use oparl_model::Entity;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Entities keyed by their derived key, in source order
pub type EntityMap<T> = IndexMap<String, Arc<T>>;

type KeyFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Keyed cache over one remote collection
///
/// Records whose key is missing or empty are dropped. Later records with a
/// duplicate key replace earlier ones in place.
pub struct EntityStore<T> {
    label: String,
    url: String,
    fetcher: Arc<dyn Fetcher>,
    key_fn: KeyFn<T>,
    data: OnceCell<Arc<EntityMap<T>>>,
}

impl<T> EntityStore<T>
where
    T: Entity + DeserializeOwned + Send + Sync + 'static,
{
    /// Create store keyed by [`Entity::id`]
    pub fn new(label: impl Into<String>, url: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_key(label, url, fetcher, |item: &T| Some(item.id().to_string()))
    }
}

impl<T> EntityStore<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Create store with a custom key extractor
    pub fn with_key<F>(
        label: impl Into<String>,
        url: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        key_fn: F,
    ) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            url: url.into(),
            fetcher,
            key_fn: Arc::new(key_fn),
            data: OnceCell::new(),
        }
    }

    /// Collection name used in logs
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the collection has been fetched
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.data.initialized()
    }

    /// Full keyed map, fetching it on first call
    pub async fn entries(&self) -> Arc<EntityMap<T>> {
        Arc::clone(self.data.get_or_init(|| self.initialize()).await)
    }

    /// Entity for `key`
    pub async fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries().await.get(key).cloned()
    }

    /// All entities in source order
    pub async fn get_all(&self) -> Vec<Arc<T>> {
        self.entries().await.values().cloned().collect()
    }

    #[instrument(skip(self), fields(collection = %self.label))]
    async fn initialize(&self) -> Arc<EntityMap<T>> {
        let items: Vec<T> = fetch_list(self.fetcher.as_ref(), &self.url, &self.label).await;
        let map = self.index(items);
        info!(entries = map.len(), "collection loaded");
        Arc::new(map)
    }

    fn index(&self, items: Vec<T>) -> EntityMap<T> {
        let total = items.len();
        let map: EntityMap<T> = items
            .into_iter()
            .filter_map(|item| {
                let key = (self.key_fn)(&item).filter(|key| !key.is_empty())?;
                Some((key, Arc::new(item)))
            })
            .collect();
        if map.len() < total {
            debug!(dropped = total - map.len(), "records without key or with duplicate key");
        }
        map
    }
}

impl<T> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("label", &self.label)
            .field("url", &self.url)
            .field("initialized", &self.data.initialized())
            .finish_non_exhaustive()
    }
}
