//! City district ("Stadtteil") associations
//!
//! The external source may supply a single string, an array of strings, or
//! nothing at all for a paper. [`Districts`] normalizes all of these into a
//! deduplicated, trimmed set that remembers first-seen order for display.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Separator used when districts are serialized into a single attribute
pub const FILTER_VALUE_SEPARATOR: char = '|';

/// Normalized set of districts mentioned by a paper
///
/// Equality is set equality: insertion order is kept for labels but does not
/// affect comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Districts(IndexSet<String>);

impl Districts {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a loosely-typed JSON value
    ///
    /// - string → one district
    /// - array → every string element, non-strings ignored
    /// - anything else (null, absent, numbers, objects) → empty
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(single) => Self::from_names([single.as_str()]),
            Value::Array(items) => Self::from_names(items.iter().filter_map(Value::as_str)),
            _ => Self::new(),
        }
    }

    /// Normalize a list of names: trim, drop empties, deduplicate
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Parse a pipe-delimited filter value (`"Durlach|Mühlburg"`)
    #[must_use]
    pub fn from_filter_value(raw: &str) -> Self {
        Self::from_names(raw.split(FILTER_VALUE_SEPARATOR))
    }

    /// Whether the district is in the set
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Number of districts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no district is associated
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined display label, `None` when empty
    #[must_use]
    pub fn label(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.iter().collect::<Vec<_>>().join(", "))
        }
    }

    /// Pipe-joined value for the row's district attribute
    #[must_use]
    pub fn filter_value(&self) -> String {
        self.iter()
            .collect::<Vec<_>>()
            .join(&FILTER_VALUE_SEPARATOR.to_string())
    }
}

impl<S: AsRef<str>> FromIterator<S> for Districts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}

impl Serialize for Districts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for Districts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.map(|v| Self::from_value(&v)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn bare_string_becomes_single_district() {
        let districts = Districts::from_value(&json!("Durlach"));
        assert_eq!(districts, Districts::from_names(["Durlach"]));
        assert_eq!(districts.len(), 1);
    }

    #[test]
    fn null_and_absent_become_empty() {
        assert!(Districts::from_value(&Value::Null).is_empty());
        assert!(Districts::from_value(&json!({"x": 1})).is_empty());
        assert!(Districts::from_value(&json!(42)).is_empty());
    }

    #[test]
    fn arrays_are_trimmed_and_deduplicated() {
        let districts = Districts::from_value(&json!([" Durlach", "Oststadt", "Durlach ", "", 7]));
        assert_eq!(districts.iter().collect::<Vec<_>>(), vec!["Durlach", "Oststadt"]);
    }

    #[test]
    fn equality_ignores_order() {
        let a = Districts::from_names(["Durlach", "Oststadt"]);
        let b = Districts::from_names(["Oststadt", "Durlach"]);
        assert_eq!(a, b);
    }

    #[test]
    fn label_and_filter_value() {
        let districts = Districts::from_names(["Durlach", "Oststadt"]);
        assert_eq!(districts.label().as_deref(), Some("Durlach, Oststadt"));
        assert_eq!(districts.filter_value(), "Durlach|Oststadt");
        assert_eq!(Districts::new().label(), None);
        assert_eq!(Districts::new().filter_value(), "");
    }

    #[test]
    fn filter_value_parses_back() {
        let parsed = Districts::from_filter_value("Durlach||Oststadt|");
        assert_eq!(parsed, Districts::from_names(["Durlach", "Oststadt"]));
        assert!(parsed.contains("Durlach"));
        assert!(!parsed.contains("Weststadt"));
    }

    #[test]
    fn deserializes_from_any_shape() {
        let single: Districts = serde_json::from_str(r#""Durlach""#).unwrap();
        let many: Districts = serde_json::from_str(r#"["Durlach", "Oststadt"]"#).unwrap();
        let none: Districts = serde_json::from_str("null").unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(many.len(), 2);
        assert!(none.is_empty());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(names in proptest::collection::vec("[ a-zA-Zäöü|]{0,12}", 0..8)) {
            let once = Districts::from_names(&names);
            let twice = Districts::from_names(once.iter());
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|n| !n.is_empty() && n.trim() == n));
        }
    }
}
