//! Attached files and their extracted text
//!
//! File contents arrive in two parts: a metadata record per file, and the
//! extracted text, which is shipped separately in numbered chunk files. The
//! text slot on [`FileContent`] is therefore filled out-of-band, at most once.

use crate::de::null_as_default;
use crate::entity::Entity;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// A file attached to a paper, meeting or agenda item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryFile {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// File name on the source system
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    /// MIME type
    #[serde(default, deserialize_with = "null_as_default")]
    pub mime_type: String,
    /// Document date
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// Viewer URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub access_url: String,
    /// Download URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
}

impl Entity for AuxiliaryFile {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

/// Write-once slot for extracted text
#[derive(Default)]
pub struct TextSlot(OnceLock<String>);

impl TextSlot {
    /// Slot that already holds text
    #[must_use]
    pub fn filled(text: impl Into<String>) -> Self {
        let slot = Self::default();
        slot.fill(text);
        slot
    }

    /// Store text if the slot is still empty
    ///
    /// Returns `true` when this call filled the slot.
    pub fn fill(&self, text: impl Into<String>) -> bool {
        self.0.set(text.into()).is_ok()
    }

    /// Current text, if it has arrived
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

impl Clone for TextSlot {
    fn clone(&self) -> Self {
        match self.get() {
            Some(text) => Self::filled(text),
            None => Self::default(),
        }
    }
}

impl PartialEq for TextSlot {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for TextSlot {}

impl fmt::Debug for TextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(text) => write!(f, "TextSlot({} chars)", text.chars().count()),
            None => f.write_str("TextSlot(empty)"),
        }
    }
}

impl Serialize for TextSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TextSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(TextSlot::filled)
            .unwrap_or_default())
    }
}

/// Availability of a file's extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextState<'a> {
    /// The file has no extractable text
    Absent,
    /// Text exists upstream but its chunk has not been merged (yet)
    Pending,
    /// Text is available
    Available(&'a str),
}

/// Extraction metadata for one attached file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// File id (matches [`AuxiliaryFile::id`])
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Download URL of the source file
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_url: String,
    /// Modification timestamp of the source file
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_modified: String,
    /// When the text was last extracted
    #[serde(default)]
    pub last_modified_extracted_date: Option<String>,
    /// Whether extractable text exists upstream
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_extracted_text: bool,
    /// Extracted text, filled from chunk files
    #[serde(default)]
    pub extracted_text: TextSlot,
}

impl FileContent {
    /// Extracted text if it has arrived
    #[inline]
    #[must_use]
    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.get()
    }

    /// Classify text availability
    ///
    /// A record that declares text but has none yet is [`TextState::Pending`],
    /// never [`TextState::Absent`].
    #[must_use]
    pub fn text_state(&self) -> TextState<'_> {
        match (self.extracted_text(), self.has_extracted_text) {
            (Some(text), _) => TextState::Available(text),
            (None, true) => TextState::Pending,
            (None, false) => TextState::Absent,
        }
    }

    /// Merge text delivered by a chunk file
    ///
    /// Only records that declared `has_extracted_text` accept text; returns
    /// `true` when the text was stored by this call.
    pub fn merge_chunk_text(&self, text: &str) -> bool {
        self.has_extracted_text && self.extracted_text.fill(text)
    }
}

impl Entity for FileContent {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

/// One entry of a `file-contents-chunks/chunk-<n>.json` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    /// File id
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Extracted text
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn content(has_text: bool) -> FileContent {
        FileContent {
            id: "f1".to_string(),
            has_extracted_text: has_text,
            ..FileContent::default()
        }
    }

    #[test]
    fn declared_text_is_pending_until_merged() {
        let record = content(true);
        assert_eq!(record.text_state(), TextState::Pending);

        assert!(record.merge_chunk_text("Beschlussvorlage"));
        assert_eq!(record.text_state(), TextState::Available("Beschlussvorlage"));
    }

    #[test]
    fn undeclared_text_is_never_merged() {
        let record = content(false);
        assert!(!record.merge_chunk_text("stray"));
        assert_eq!(record.text_state(), TextState::Absent);
    }

    #[test]
    fn text_is_written_once() {
        let record = content(true);
        assert!(record.merge_chunk_text("first"));
        assert!(!record.merge_chunk_text("second"));
        assert_eq!(record.extracted_text(), Some("first"));
    }

    #[test]
    fn inline_text_from_metadata_is_kept() {
        let record: FileContent = serde_json::from_str(
            r#"{"id":"f1","hasExtractedText":true,"extractedText":"inline"}"#,
        )
        .unwrap();
        assert_eq!(record.extracted_text(), Some("inline"));
    }

    #[test]
    fn clone_copies_text() {
        let record = content(true);
        record.merge_chunk_text("text");
        let copy = record.clone();
        assert_eq!(copy, record);
        assert_eq!(copy.extracted_text(), Some("text"));
    }
}
