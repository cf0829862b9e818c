//! Meetings and their embedded agenda items

use crate::de::null_as_default;
use crate::entity::Entity;
use crate::file::AuxiliaryFile;
use serde::{Deserialize, Serialize};

/// A scheduled sitting of an organizational body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Title
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Start timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    /// End timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    /// Venue
    #[serde(default)]
    pub location: Option<Location>,
    /// Participating organization ids
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization: Vec<String>,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
    /// Invitation document
    #[serde(default)]
    pub invitation: Option<AuxiliaryFile>,
    /// Results protocol
    #[serde(default)]
    pub results_protocol: Option<AuxiliaryFile>,
    /// Further attachments
    #[serde(default, deserialize_with = "null_as_default")]
    pub auxiliary_file: Vec<AuxiliaryFile>,
    /// Agenda, in source order
    #[serde(default, deserialize_with = "null_as_default")]
    pub agenda_item: Vec<AgendaItem>,
}

impl Meeting {
    /// Find the agenda item with the given id
    #[must_use]
    pub fn agenda_item(&self, id: &str) -> Option<&AgendaItem> {
        self.agenda_item.iter().find(|item| item.id == id)
    }
}

impl Entity for Meeting {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}

/// One discussion point within a meeting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Owning meeting id
    #[serde(default, deserialize_with = "null_as_default")]
    pub meeting: String,
    /// Displayed item number, e.g. `5.1`
    #[serde(default, deserialize_with = "null_as_default")]
    pub number: String,
    /// Position within the agenda
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: i64,
    /// Title
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Whether the item was discussed publicly
    #[serde(default, deserialize_with = "null_as_default")]
    pub public: bool,
    /// Linked consultation id
    #[serde(default)]
    pub consultation: Option<String>,
    /// Consultation result, e.g. `zugestimmt`
    #[serde(default)]
    pub result: Option<String>,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
    /// Attachments
    #[serde(default, deserialize_with = "null_as_default")]
    pub auxiliary_file: Vec<AuxiliaryFile>,
}

impl AgendaItem {
    /// Non-empty result string
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref().filter(|result| !result.is_empty())
    }
}

/// Venue of a meeting
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Free-text description, usually the room and address
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn agenda_item_lookup() {
        let meeting: Meeting = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "agendaItem": [
                {"id": "a1", "order": 1, "result": "zugestimmt"},
                {"id": "a2", "order": 2, "result": ""}
            ]
        }))
        .unwrap();

        assert_eq!(meeting.agenda_item("a1").and_then(AgendaItem::result), Some("zugestimmt"));
        assert_eq!(meeting.agenda_item("a2").and_then(AgendaItem::result), None);
        assert!(meeting.agenda_item("missing").is_none());
    }

    #[test]
    fn missing_agenda_is_empty() {
        let meeting: Meeting = serde_json::from_str(r#"{"id":"m1","agendaItem":null}"#).unwrap();
        assert!(meeting.agenda_item.is_empty());
        assert!(meeting.location.is_none());
    }
}
