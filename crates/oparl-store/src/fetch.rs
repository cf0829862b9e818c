//! Transport seam for the remote data source
//!
//! Everything the archive reads goes through [`Fetcher`]: the deployed site
//! over HTTP, a local mirror of the generated JSON files, or an in-memory
//! map for tests.

use crate::error::FetchError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetch raw documents by URL
#[async_trait]
pub trait Fetcher: Send + Sync + fmt::Debug {
    /// Fetch the document body
    ///
    /// # Errors
    /// - [`FetchError::NotFound`] when the document does not exist
    /// - any other variant for failed requests
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create fetcher with a default client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create fetcher whose requests time out after `timeout`
    ///
    /// # Errors
    /// Returns [`FetchError::Transport`] if the client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::transport("<client>", e))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(url));
        }
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        debug!(bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}

/// Fetcher reading a local mirror of the published files
///
/// URLs below `base_url` map onto paths below `root`.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    base_url: String,
    root: PathBuf,
}

impl FsFetcher {
    /// Create fetcher mapping `base_url` onto `root`
    pub fn new(base_url: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            root: root.into(),
        }
    }

    /// Mirror root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.base_url)?;
        if !rest.is_empty() && !rest.starts_with('/') {
            return None;
        }
        let relative = rest.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.path_for(url).ok_or_else(|| FetchError::not_found(url))?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::not_found(url)),
            Err(e) => Err(FetchError::transport(url, e)),
        }
    }
}

/// In-memory fetcher that counts requests
///
/// Unregistered URLs answer [`FetchError::NotFound`].
#[derive(Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, Result<Vec<u8>, FetchError>>>,
    requests: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryFetcher {
    /// Create empty fetcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Serve raw bytes at `url`
    pub fn insert_bytes(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.responses.lock().insert(url.into(), Ok(body.into()));
    }

    /// Serve `value` as JSON at `url`
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] if `value` cannot be serialized.
    pub fn insert_json<T: Serialize + ?Sized>(
        &self,
        url: impl Into<String>,
        value: &T,
    ) -> Result<(), FetchError> {
        let url = url.into();
        let body = serde_json::to_vec(value).map_err(|e| FetchError::decode(url.clone(), e))?;
        self.insert_bytes(url, body);
        Ok(())
    }

    /// Answer `url` with `error`
    pub fn fail(&self, url: impl Into<String>, error: FetchError) {
        self.responses.lock().insert(url.into(), Err(error));
    }

    /// Stop serving `url`
    pub fn remove(&self, url: &str) {
        self.responses.lock().remove(url);
    }

    /// Number of requests made for `url`
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().get(url).copied().unwrap_or(0)
    }

    /// Number of requests made overall
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MemoryFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFetcher")
            .field("urls", &self.responses.lock().len())
            .field("total_requests", &self.total_requests())
            .field("latency", &self.latency)
            .finish()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.requests.lock().entry(url.to_string()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::not_found(url)))
    }
}
