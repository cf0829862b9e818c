//! Browser history seam for URL synchronization

/// Current location and in-place URL replacement
pub trait History {
    /// Current absolute URL
    fn href(&self) -> String;

    /// Replace the current entry without navigating
    fn replace_state(&mut self, href: &str);
}

/// In-memory history that records replacements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    href: String,
    replacements: Vec<String>,
}

impl MemoryHistory {
    /// Start at `href`
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            replacements: Vec::new(),
        }
    }

    /// Every URL passed to [`History::replace_state`], oldest first
    #[must_use]
    pub fn replacements(&self) -> &[String] {
        &self.replacements
    }
}

impl History for MemoryHistory {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn replace_state(&mut self, href: &str) {
        self.href = href.to_string();
        self.replacements.push(href.to_string());
    }
}
