//! Dotted key decomposition and nested value access
//!
//! A key such as `plan.limits.seats` is stored under the root key `plan`;
//! the remainder `limits.seats` addresses a field inside the structured
//! value kept in that record.

use crate::contract::SettingsError;
use serde_json::{Map, Value};

/// A validated, decomposed settings key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    full: String,
    root_len: usize,
}

impl KeyPath {
    /// Validate and decompose a key.
    ///
    /// Accepts only ASCII letters, digits, `_`, `.` and `-`. Empty keys and
    /// keys with empty segments (`.a`, `a.`, `a..b`) are rejected too.
    pub fn parse(key: &str) -> Result<Self, SettingsError> {
        if key.is_empty() || !key.chars().all(is_key_char) {
            return Err(SettingsError::invalid_key(key));
        }
        if key.split('.').any(str::is_empty) {
            return Err(SettingsError::invalid_key(key));
        }

        let root_len = key.find('.').unwrap_or(key.len());
        Ok(Self {
            full: key.to_string(),
            root_len,
        })
    }

    /// The key as given by the caller
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Storage key: everything before the first dot
    pub fn root(&self) -> &str {
        &self.full[..self.root_len]
    }

    /// Path inside the stored structure, if the key was dotted
    pub fn nested(&self) -> Option<&str> {
        self.full.get(self.root_len + 1..)
    }

    pub fn is_nested(&self) -> bool {
        self.root_len < self.full.len()
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full)
    }
}

/// Largest number of `null` slots an indexed write may append to an array
pub const MAX_INDEX_GAP: usize = 16;

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

/// Resolve `path` inside `structure`, `None` when any segment is missing.
///
/// Object levels are addressed by name, array levels by decimal index.
pub fn deep_get<'a>(structure: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(structure, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Set `value` at `path`, creating intermediate objects as needed.
///
/// Siblings at every level are left untouched. A scalar found where a
/// container is needed is replaced by an object; an array addressed with a
/// non-numeric segment is turned into an object keyed by its indices, and
/// so is one addressed with an index more than [`MAX_INDEX_GAP`] past its
/// end.
pub fn deep_set(mut structure: Value, path: &str, value: Value) -> Value {
    let mut current = &mut structure;
    for segment in path.split('.') {
        current = child_slot(current, segment);
    }
    *current = value;
    structure
}

/// Remove the leaf at `path`. Returns whether something was removed.
pub fn deep_remove(structure: &mut Value, path: &str) -> bool {
    let (parent_path, leaf) = match path.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    };

    let parent = match parent_path {
        Some(p) => match deep_get_mut(structure, p) {
            Some(parent) => parent,
            None => return false,
        },
        None => structure,
    };

    match parent {
        Value::Object(map) => map.remove(leaf).is_some(),
        Value::Array(items) => match leaf.parse::<usize>() {
            Ok(i) if i < items.len() => {
                items.remove(i);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

/// Empty structure used when a record has no stored structure yet
pub fn empty_structure() -> Value {
    Value::Object(Map::new())
}

fn deep_get_mut<'a>(structure: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(structure, |current, segment| match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

fn child_slot<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    let mut index = segment.parse::<usize>().ok();

    if let Value::Array(items) = &mut *current {
        index = index.filter(|i| *i <= items.len().saturating_add(MAX_INDEX_GAP));
        if index.is_none() {
            let converted: Map<String, Value> = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *current = Value::Object(converted);
        }
    } else if !current.is_object() {
        *current = empty_structure();
    }

    match (current, index) {
        (Value::Array(items), Some(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_key() {
        let path = KeyPath::parse("retries").unwrap();
        assert_eq!(path.root(), "retries");
        assert_eq!(path.nested(), None);
        assert!(!path.is_nested());
    }

    #[test]
    fn test_parse_dotted_key() {
        let path = KeyPath::parse("plan.limits.seats").unwrap();
        assert_eq!(path.root(), "plan");
        assert_eq!(path.nested(), Some("limits.seats"));
        assert_eq!(path.full(), "plan.limits.seats");
    }

    #[test]
    fn test_parse_allowed_characters() {
        for key in ["a-b", "A_1", "x.y-z_9", "0"] {
            assert!(KeyPath::parse(key).is_ok(), "{key} should be accepted");
        }
    }

    #[test]
    fn test_parse_rejects_invalid_keys() {
        for key in ["", "a b", "a/b", "é", "key!", ".a", "a.", "a..b", "a:b"] {
            match KeyPath::parse(key) {
                Err(SettingsError::InvalidKey { key: rejected }) => assert_eq!(rejected, key),
                other => panic!("expected InvalidKey for {key:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_key_message_lists_key() {
        let err = KeyPath::parse("bad key").unwrap_err();
        assert!(err.to_string().contains("Given key: bad key"));
    }

    #[test]
    fn test_deep_get_objects_and_arrays() {
        let doc = json!({"a": {"b": [10, {"c": true}]}});
        assert_eq!(deep_get(&doc, "a.b.0"), Some(&json!(10)));
        assert_eq!(deep_get(&doc, "a.b.1.c"), Some(&json!(true)));
        assert_eq!(deep_get(&doc, "a.x"), None);
        assert_eq!(deep_get(&doc, "a.b.7"), None);
        assert_eq!(deep_get(&doc, "a.b.0.z"), None);
    }

    #[test]
    fn test_deep_set_creates_intermediates() {
        let doc = deep_set(empty_structure(), "a.b.c", json!(1));
        assert_eq!(doc, json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_deep_set_keeps_siblings() {
        let doc = json!({"a": {"b": 1, "keep": "me"}, "other": [1, 2]});
        let doc = deep_set(doc, "a.c", json!(2));
        assert_eq!(doc, json!({"a": {"b": 1, "c": 2, "keep": "me"}, "other": [1, 2]}));
    }

    #[test]
    fn test_deep_set_overwrites_leaf() {
        let doc = deep_set(json!({"a": {"b": 1}}), "a.b", json!("x"));
        assert_eq!(doc, json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_deep_set_replaces_scalar_on_the_way() {
        let doc = deep_set(json!({"a": 5}), "a.b", json!(true));
        assert_eq!(doc, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_deep_set_array_index() {
        let doc = deep_set(json!({"list": [1, 2]}), "list.1", json!(20));
        assert_eq!(doc, json!({"list": [1, 20]}));

        let doc = deep_set(json!({"list": [1]}), "list.3", json!(4));
        assert_eq!(doc, json!({"list": [1, null, null, 4]}));
    }

    #[test]
    fn test_deep_set_far_index_converts_array() {
        let doc = deep_set(json!({"list": [1]}), "list.18446744073709551615", json!(2));
        assert_eq!(doc, json!({"list": {"0": 1, "18446744073709551615": 2}}));

        let doc = deep_set(json!({"list": [1]}), "list.4000000000", json!(2));
        assert_eq!(doc, json!({"list": {"0": 1, "4000000000": 2}}));

        let doc = deep_set(json!({"list": []}), "list.16", json!(true));
        assert_eq!(doc["list"].as_array().map(Vec::len), Some(17));
    }

    #[test]
    fn test_deep_set_named_segment_on_array() {
        let doc = deep_set(json!({"list": ["x"]}), "list.name", json!("y"));
        assert_eq!(doc, json!({"list": {"0": "x", "name": "y"}}));
    }

    #[test]
    fn test_deep_remove_leaf_only() {
        let mut doc = json!({"plan": {"tier": "gold", "seats": 3}});
        assert!(deep_remove(&mut doc, "plan.tier"));
        assert_eq!(doc, json!({"plan": {"seats": 3}}));
        assert!(!deep_remove(&mut doc, "plan.missing"));
        assert!(!deep_remove(&mut doc, "nope.tier"));
    }

    #[test]
    fn test_deep_remove_top_level_and_array() {
        let mut doc = json!({"tier": "gold", "list": [1, 2, 3]});
        assert!(deep_remove(&mut doc, "tier"));
        assert!(deep_remove(&mut doc, "list.0"));
        assert_eq!(doc, json!({"list": [2, 3]}));
    }
}
