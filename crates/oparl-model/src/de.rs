//! Lenient deserialization helpers for loosely-typed remote data

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value
///
/// The syndication feed emits `null` for empty lists and strings in places
/// where the schema says the field is always present.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_as_default")]
        values: Vec<String>,
    }

    #[test]
    fn null_becomes_default() {
        let holder: Holder = serde_json::from_str(r#"{"values": null}"#).unwrap();
        assert!(holder.values.is_empty());
    }

    #[test]
    fn missing_becomes_default() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert!(holder.values.is_empty());
    }

    #[test]
    fn present_value_kept() {
        let holder: Holder = serde_json::from_str(r#"{"values": ["a"]}"#).unwrap();
        assert_eq!(holder.values, vec!["a".to_string()]);
    }
}
