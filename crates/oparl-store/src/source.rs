//! Locations of the published collections

use std::fmt;

/// A published JSON collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// `papers.json`
    Papers,
    /// `meetings.json`
    Meetings,
    /// `organizations.json`
    Organizations,
    /// `file-contents.json`
    FileContents,
    /// `paper-stadtteile.json`
    PaperStadtteile,
}

impl Collection {
    /// All collections
    pub const ALL: [Collection; 5] = [
        Collection::Papers,
        Collection::Meetings,
        Collection::Organizations,
        Collection::FileContents,
        Collection::PaperStadtteile,
    ];

    /// File name relative to the data base URL
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Papers => "papers.json",
            Self::Meetings => "meetings.json",
            Self::Organizations => "organizations.json",
            Self::FileContents => "file-contents.json",
            Self::PaperStadtteile => "paper-stadtteile.json",
        }
    }

    /// Short name used in logs
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Meetings => "meetings",
            Self::Organizations => "organizations",
            Self::FileContents => "file-contents",
            Self::PaperStadtteile => "paper-stadtteile",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base URL of the published data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    base_url: String,
}

impl DataSource {
    /// Directory holding the numbered text chunks
    pub const CHUNK_DIR: &'static str = "file-contents-chunks";

    /// Create source rooted at `base_url` (trailing slashes are ignored)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a collection file
    #[must_use]
    pub fn url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.file_name())
    }

    /// URL of text chunk `index`
    #[must_use]
    pub fn chunk_url(&self, index: usize) -> String {
        format!("{}/{}/chunk-{index}.json", self.base_url, Self::CHUNK_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn collection_urls() {
        let source = DataSource::new("https://example.org/docs/");
        assert_eq!(source.base_url(), "https://example.org/docs");
        assert_eq!(
            source.url(Collection::PaperStadtteile),
            "https://example.org/docs/paper-stadtteile.json"
        );
        assert_eq!(
            source.url(Collection::FileContents),
            "https://example.org/docs/file-contents.json"
        );
    }

    #[test]
    fn chunk_urls_are_numbered_from_zero() {
        let source = DataSource::new("/docs");
        assert_eq!(source.chunk_url(0), "/docs/file-contents-chunks/chunk-0.json");
        assert_eq!(source.chunk_url(12), "/docs/file-contents-chunks/chunk-12.json");
    }

    #[test]
    fn every_collection_has_a_distinct_file() {
        let names: HashSet<_> = Collection::ALL.iter().map(|c| c.file_name()).collect();
        assert_eq!(names.len(), Collection::ALL.len());
    }
}
