//! Archive configuration
//!
//! Layered lowest to highest: [`ArchiveConfig::default`], a TOML file
//! ([`ArchiveConfig::from_toml_str`]), the environment
//! ([`ArchiveConfig::with_env`]) and finally explicit `with_*` calls.

use oparl_model::BULK_MODIFIED_DATE;
use oparl_store::{ChunkLoading, DataSource, DEFAULT_CHUNK_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Published data of the Karlsruhe council archive
pub const DEFAULT_BASE_URL: &str =
    "https://raw.githubusercontent.com/maxliesegang/karlsruhe-oparl-syndication/refs/heads/main/docs";

/// Environment variable overriding [`ArchiveConfig::base_url`]
pub const ENV_BASE_URL: &str = "OPARL_BASE_URL";
/// Environment variable overriding [`ArchiveConfig::bulk_modified_date`]
pub const ENV_BULK_MODIFIED_DATE: &str = "OPARL_BULK_MODIFIED_DATE";
/// Environment variable overriding [`ArchiveConfig::chunk_batch_size`]
pub const ENV_CHUNK_BATCH_SIZE: &str = "OPARL_CHUNK_BATCH_SIZE";
/// Environment variable overriding [`ArchiveConfig::max_chunks`]
pub const ENV_MAX_CHUNKS: &str = "OPARL_MAX_CHUNKS";

/// Errors in configuration input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration file: {0}")]
    Parse(String),

    /// A value is out of range or malformed
    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Configuration of one archive context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Base URL of the published JSON files
    pub base_url: String,
    /// Date of the bulk import that restamped `modified`
    pub bulk_modified_date: String,
    /// Chunks requested concurrently
    pub chunk_batch_size: usize,
    /// Upper bound on the chunk series
    pub max_chunks: Option<usize>,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bulk_modified_date: BULK_MODIFIED_DATE.to_string(),
            chunk_batch_size: DEFAULT_CHUNK_BATCH_SIZE,
            max_chunks: None,
            request_timeout_secs: 30,
        }
    }
}

impl ArchiveConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the process environment
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when a variable holds a malformed number.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] when a variable holds a malformed number.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(date) = lookup(ENV_BULK_MODIFIED_DATE) {
            self.bulk_modified_date = date;
        }
        if let Some(raw) = lookup(ENV_CHUNK_BATCH_SIZE) {
            self.chunk_batch_size = parse_count("chunk_batch_size", &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_CHUNKS) {
            self.max_chunks = Some(parse_count("max_chunks", &raw)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set bulk-import date
    #[must_use]
    pub fn with_bulk_modified_date(mut self, date: impl Into<String>) -> Self {
        self.bulk_modified_date = date.into();
        self
    }

    /// Set chunk batch size
    #[must_use]
    pub fn with_chunk_batch_size(mut self, size: usize) -> Self {
        self.chunk_batch_size = size;
        self
    }

    /// Set chunk limit
    #[must_use]
    pub fn with_max_chunks(mut self, max_chunks: Option<usize>) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set request timeout
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for an empty base URL or a zero batch size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.chunk_batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_batch_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Data source rooted at [`Self::base_url`]
    #[must_use]
    pub fn data_source(&self) -> DataSource {
        DataSource::new(self.base_url.clone())
    }

    /// Chunk policy for the file-content store
    #[must_use]
    pub fn chunk_loading(&self) -> ChunkLoading {
        ChunkLoading {
            batch_size: self.chunk_batch_size,
            max_chunks: self.max_chunks,
        }
    }

    /// Request timeout as a duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_count(field: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        message: format!("expected a non-negative integer, got {raw:?}"),
    })
}
