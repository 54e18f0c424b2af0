//! Shape predicates over expanded JSON-LD values.

use serde_json::Value;

use crate::keywords;

/// `{"@list": [...]}`
pub fn is_list_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key(keywords::LIST))
}

/// `{"@value": ..., ...}`
pub fn is_value_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key(keywords::VALUE))
}

/// A map whose only key is `@id`.
pub fn is_node_reference(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.len() == 1 && map.contains_key(keywords::ID))
}

/// View a value as a sequence: arrays as their items, anything else as one item.
pub fn as_slice(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

/// Owned counterpart of [`as_slice`].
pub fn into_vec(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
