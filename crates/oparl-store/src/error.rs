//! Error types for fetching remote collections
//!
//! These errors stay inside the store layer: loaders log them and fall back
//! to empty collections. Chunk loading inspects them to tell the end of the
//! chunk series ([`FetchError::NotFound`]) from a real failure.

/// Errors while fetching a remote document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The document does not exist (HTTP 404, missing file)
    #[error("not found: {url}")]
    NotFound {
        /// Requested URL
        url: String,
    },

    /// Non-success HTTP status other than 404
    #[error("unexpected status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Network or IO failure before a response was received
    #[error("transport error for {url}: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying error text
        message: String,
    },

    /// The body is not the expected JSON shape
    #[error("invalid data from {url}: {message}")]
    Decode {
        /// Requested URL
        url: String,
        /// Parser error text
        message: String,
    },
}

impl FetchError {
    /// Create not-found error for url
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Create status error for url
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Create transport error for url
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create decode error for url
    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the document simply does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// URL the error refers to
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url }
            | Self::Status { url, .. }
            | Self::Transport { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }
}
