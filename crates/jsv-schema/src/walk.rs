//! # Schema Tree Walker
//!
//! Pre-order traversal over a JSON value tree that reports every object node
//! together with a descriptive label. Arrays are transparent (their elements
//! are visited, the array itself is not) and scalars end the recursion.
//!
//! Labels are for diagnostics only:
//!
//! - the unnamed root is [`ROOT_LABEL`];
//! - an object member is `<parent>/<key>`, the root contributing an empty
//!   prefix (`/properties/name`);
//! - an array element is `array item of '<parent>'`.

use serde_json::{Map, Value};

/// Label of the unnamed root node.
pub const ROOT_LABEL: &str = "ROOT";

/// Visit every object node of `root`, parents before children.
pub fn walk<F>(root: &Value, mut visit: F)
where
    F: FnMut(&str, &Map<String, Value>),
{
    walk_node(None, root, &mut visit);
}

/// Like [`walk`], but the visitor may edit each object before its children
/// are traversed. Members inserted by the visitor are traversed as well.
pub fn walk_mut<F>(root: &mut Value, mut visit: F)
where
    F: FnMut(&str, &mut Map<String, Value>),
{
    walk_node_mut(None, root, &mut visit);
}

fn member_label(name: Option<&str>, key: &str) -> String {
    format!("{}/{}", name.unwrap_or(""), key)
}

fn item_label(label: &str) -> String {
    format!("array item of '{label}'")
}

fn walk_node<F>(name: Option<&str>, node: &Value, visit: &mut F)
where
    F: FnMut(&str, &Map<String, Value>),
{
    let label = name.unwrap_or(ROOT_LABEL);
    match node {
        Value::Object(map) => {
            visit(label, map);
            for (key, child) in map {
                walk_node(Some(&member_label(name, key)), child, visit);
            }
        }
        Value::Array(items) => {
            let item = item_label(label);
            for child in items {
                walk_node(Some(&item), child, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn walk_node_mut<F>(name: Option<&str>, node: &mut Value, visit: &mut F)
where
    F: FnMut(&str, &mut Map<String, Value>),
{
    let label = name.unwrap_or(ROOT_LABEL);
    match node {
        Value::Object(map) => {
            visit(label, map);
            for (key, child) in map.iter_mut() {
                walk_node_mut(Some(&member_label(name, key)), child, visit);
            }
        }
        Value::Array(items) => {
            let item = item_label(label);
            for child in items.iter_mut() {
                walk_node_mut(Some(&item), child, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        walk(value, |label, _| out.push(label.to_string()));
        out
    }

    #[test]
    fn test_root_label() {
        assert_eq!(labels(&json!({})), vec![ROOT_LABEL]);
    }

    #[test]
    fn test_pre_order_member_labels() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" }
            }
        });
        assert_eq!(
            labels(&schema),
            vec!["ROOT", "/properties", "/properties/name"]
        );
    }

    #[test]
    fn test_array_items_are_relabeled_not_visited() {
        let schema = json!({
            "oneOf": [
                { "type": "object" },
                { "type": "string" }
            ]
        });
        assert_eq!(
            labels(&schema),
            vec!["ROOT", "array item of '/oneOf'", "array item of '/oneOf'"]
        );
    }

    #[test]
    fn test_root_array_uses_root_label() {
        assert_eq!(
            labels(&json!([{}, [{}]])),
            vec![
                "array item of 'ROOT'",
                "array item of 'array item of 'ROOT''"
            ]
        );
    }

    #[test]
    fn test_scalars_and_empty_arrays_are_not_visited() {
        assert!(labels(&json!("object")).is_empty());
        assert!(labels(&json!(42)).is_empty());
        assert!(labels(&json!(null)).is_empty());
        assert!(labels(&json!([])).is_empty());
        assert!(labels(&json!([1, "two", false])).is_empty());
    }

    #[test]
    fn test_walk_mut_visits_parent_before_children() {
        let mut schema = json!({
            "properties": {
                "inner": {}
            }
        });
        let mut depth_seen = Vec::new();
        walk_mut(&mut schema, |label, map| {
            depth_seen.push(label.matches('/').count());
            map.insert("visited".into(), Value::Bool(true));
        });
        assert_eq!(depth_seen, vec![0, 1, 2]);
        assert_eq!(schema["visited"], true);
        assert_eq!(schema["properties"]["visited"], true);
        assert_eq!(schema["properties"]["inner"]["visited"], true);
    }

    #[test]
    fn test_walk_mut_without_edits_leaves_tree_unchanged() {
        let original = json!({"a": [{"b": 1}, 2], "c": {"d": null}});
        let mut copy = original.clone();
        walk_mut(&mut copy, |_, _| {});
        assert_eq!(copy, original);
    }
}
