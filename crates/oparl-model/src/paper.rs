//! Papers and their consultations
//!
//! A paper's public slug ([`internal_reference`]) and its year bucket
//! ([`relevant_year`]) are derived, never read from the feed.

use crate::de::null_as_default;
use crate::districts::Districts;
use crate::entity::Entity;
use crate::file::AuxiliaryFile;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date on which a bulk import restamped the `modified` field of many
/// historical papers
///
/// Papers modified on this date fall back to their own `date` field for the
/// year bucket.
pub const BULK_MODIFIED_DATE: &str = "2025-03-03";

/// Public slug for a paper reference: path separators become hyphens
///
/// # Examples
/// - `2024/0815` → `2024-0815`
/// - `GR/2019/12` → `GR-2019-12`
#[inline]
#[must_use]
pub fn internal_reference(reference: &str) -> String {
    reference.replace('/', "-")
}

/// Year bucket for a paper
///
/// Uses the first four characters of `modified`, unless `modified` starts with
/// `bulk_modified_date`, in which case the paper's own `date` decides.
#[must_use]
pub fn relevant_year<'a>(paper: &'a Paper, bulk_modified_date: &str) -> &'a str {
    if paper.modified.starts_with(bulk_modified_date) {
        leading_chars(&paper.date, 4)
    } else {
        leading_chars(&paper.modified, 4)
    }
}

fn leading_chars(value: &str, count: usize) -> &str {
    match value.char_indices().nth(count) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

/// A council paper (motion, report, request, ...)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Owning body
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Title
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Human identifier, e.g. `2024/0815`
    #[serde(default, deserialize_with = "null_as_default")]
    pub reference: String,
    /// Slug derived from `reference`; filled in when papers are loaded
    #[serde(default, deserialize_with = "null_as_default")]
    pub internal_reference: String,
    /// Paper date (`YYYY-MM-DD`)
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// Paper type, e.g. `Antrag`
    #[serde(default, deserialize_with = "null_as_default")]
    pub paper_type: String,
    /// Attached files
    #[serde(default, deserialize_with = "null_as_default")]
    pub auxiliary_file: Vec<AuxiliaryFile>,
    /// Directing organization ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub under_direction_of: Vec<String>,
    /// Consultation history, in source order
    #[serde(default, deserialize_with = "null_as_default")]
    pub consultation: Vec<Consultation>,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
    /// Soft-deletion marker
    #[serde(default, deserialize_with = "null_as_default")]
    pub deleted: bool,
    /// Districts mentioned by the paper; attached when papers are loaded
    #[serde(default)]
    pub stadtteile: Districts,
}

impl Paper {
    /// Year bucket using the default bulk-import date
    #[inline]
    #[must_use]
    pub fn relevant_year(&self) -> &str {
        relevant_year(self, BULK_MODIFIED_DATE)
    }

    /// Parsed modification timestamp
    ///
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
    #[must_use]
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.modified)
    }
}

impl Entity for Paper {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Record of a paper being considered at a meeting
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Paper id (back-reference)
    #[serde(default)]
    pub paper: Option<String>,
    /// Agenda item id within the meeting
    #[serde(default, deserialize_with = "null_as_default")]
    pub agenda_item: String,
    /// Meeting id
    #[serde(default, deserialize_with = "null_as_default")]
    pub meeting: String,
    /// Consulting organization ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization: Vec<String>,
    /// Role of the body at the time of consultation
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
}

impl Entity for Consultation {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}
