//! Organizational bodies

use crate::de::null_as_default;
use crate::entity::Entity;
use serde::{Deserialize, Serialize};

/// A council body, committee or faction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// OParl identifier
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// OParl type URI
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Owning body
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Abbreviation
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    /// Founding date
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    /// Creation timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,
    /// Modification timestamp
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,
}

impl Entity for Organization {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }
}
