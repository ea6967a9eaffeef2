//! Attribute data for documents and link instances.
//!
//! Attribute values are arbitrary JSON values keyed by attribute id. The same
//! map shape is used for raw (client) values, encoded (stored) values and
//! patches.

use std::collections::{BTreeMap, BTreeSet};

pub use serde_json::Value;

/// Attribute id -> value mapping.
pub type DataDocument = BTreeMap<String, Value>;

/// Apply a patch on top of existing data. Keys present in the patch replace
/// the stored value, other keys are kept.
pub fn apply_patch(data: &mut DataDocument, patch: &DataDocument) {
    for (key, value) in patch {
        data.insert(key.clone(), value.clone());
    }
}

/// Attribute ids present in `data` but absent from `baseline`.
pub fn introduced_keys(data: &DataDocument, baseline: &DataDocument) -> BTreeSet<String> {
    data.keys()
        .filter(|key| !baseline.contains_key(*key))
        .cloned()
        .collect()
}

/// Helper macro to create data documents.
#[macro_export]
macro_rules! data {
    () => {
        $crate::DataDocument::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = $crate::DataDocument::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_macro() {
        let empty: DataDocument = data!();
        assert!(empty.is_empty());

        let data = data! {
            "a1" => "Alice",
            "a2" => 30,
            "a3" => true,
        };
        assert_eq!(data.get("a1"), Some(&Value::from("Alice")));
        assert_eq!(data.get("a2"), Some(&Value::from(30)));
        assert_eq!(data.get("a3"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_apply_patch_overrides_and_keeps() {
        // GIVEN
        let mut data = data! { "a1" => 1, "a2" => 2 };

        // WHEN
        apply_patch(&mut data, &data! { "a2" => 20, "a3" => 30 });

        // THEN
        assert_eq!(data, data! { "a1" => 1, "a2" => 20, "a3" => 30 });
    }

    #[test]
    fn test_introduced_keys() {
        let data = data! { "a1" => 1, "a2" => Value::Null };
        let baseline = data! { "a1" => 0 };

        let keys = introduced_keys(&data, &baseline);

        assert_eq!(keys.into_iter().collect::<Vec<_>>(), vec!["a2".to_string()]);
    }
}
