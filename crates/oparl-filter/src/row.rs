//! The rendered row contract
//!
//! Each row of the table carries its filter keys as data attributes.
//! [`RowAttributes`] is the serialized form, [`PaperRow`] the parsed form the
//! engine indexes.

use oparl_model::Districts;
use serde::{Deserialize, Serialize};

/// Data attributes serialized onto one rendered row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAttributes {
    /// Date key of the row's header (`YYYY-MM-DD`)
    pub date_group: String,
    /// Year bucket
    pub year: String,
    /// Paper type
    pub paper_type: String,
    /// Directing organization names
    pub organization: String,
    /// Role of the latest consultation
    pub role: String,
    /// Result of the latest consultation
    pub result: String,
    /// Pipe-delimited district list
    pub stadtteile: String,
}

#[allow(missing_docs)]
impl RowAttributes {
    pub const DATE_GROUP: &'static str = "data-date-group";
    pub const YEAR: &'static str = "data-year";
    pub const PAPER_TYPE: &'static str = "data-paper-type";
    pub const ORGANIZATION: &'static str = "data-organization";
    pub const ROLE: &'static str = "data-role";
    pub const RESULT: &'static str = "data-result";
    pub const STADTTEILE: &'static str = "data-stadtteile";

    /// Attribute name and value pairs, in markup order
    #[must_use]
    pub fn to_pairs(&self) -> [(&'static str, &str); 7] {
        [
            (Self::DATE_GROUP, self.date_group.as_str()),
            (Self::YEAR, self.year.as_str()),
            (Self::PAPER_TYPE, self.paper_type.as_str()),
            (Self::ORGANIZATION, self.organization.as_str()),
            (Self::ROLE, self.role.as_str()),
            (Self::RESULT, self.result.as_str()),
            (Self::STADTTEILE, self.stadtteile.as_str()),
        ]
    }

    /// Read attributes from name/value pairs; missing attributes are empty
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut attributes = Self::default();
        for (name, value) in pairs {
            let slot = match name {
                Self::DATE_GROUP => &mut attributes.date_group,
                Self::YEAR => &mut attributes.year,
                Self::PAPER_TYPE => &mut attributes.paper_type,
                Self::ORGANIZATION => &mut attributes.organization,
                Self::ROLE => &mut attributes.role,
                Self::RESULT => &mut attributes.result,
                Self::STADTTEILE => &mut attributes.stadtteile,
                _ => continue,
            };
            *slot = value.to_string();
        }
        attributes
    }
}

/// Parsed row as indexed by the engine
///
/// Field meanings follow [`RowAttributes`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRow {
    pub date_group: String,
    pub year: String,
    pub paper_type: String,
    pub organization: String,
    pub role: String,
    pub result: String,
    pub stadtteile: Districts,
}

impl From<&RowAttributes> for PaperRow {
    fn from(attributes: &RowAttributes) -> Self {
        Self {
            date_group: attributes.date_group.clone(),
            year: attributes.year.clone(),
            paper_type: attributes.paper_type.clone(),
            organization: attributes.organization.clone(),
            role: attributes.role.clone(),
            result: attributes.result.clone(),
            stadtteile: Districts::from_filter_value(&attributes.stadtteile),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip() {
        let attributes = RowAttributes {
            date_group: "2024-11-02".into(),
            year: "2024".into(),
            paper_type: "Antrag".into(),
            organization: "Gemeinderat".into(),
            role: "Entscheidung".into(),
            result: "beschlossen".into(),
            stadtteile: "Durlach|Oststadt".into(),
        };
        assert_eq!(RowAttributes::from_pairs(attributes.to_pairs()), attributes);
    }

    #[test]
    fn unknown_and_missing_attributes() {
        let attributes =
            RowAttributes::from_pairs([("data-year", "2023"), ("data-color", "blau")]);
        assert_eq!(attributes.year, "2023");
        assert_eq!(attributes.stadtteile, "");
    }

    #[test]
    fn district_list_drops_empty_entries() {
        let row = PaperRow::from(&RowAttributes {
            stadtteile: "|Durlach||Oststadt|".into(),
            ..RowAttributes::default()
        });
        assert_eq!(row.stadtteile.len(), 2);
        assert!(row.stadtteile.contains("Oststadt"));

        let none = PaperRow::from(&RowAttributes::default());
        assert!(none.stadtteile.is_empty());
    }
}
