//! # Strictness Transformer
//!
//! Derives the strict variant of a schema: every object schema node that
//! does not state an `additionalProperties` policy gets
//! `"additionalProperties": false`, so any undeclared property becomes a
//! validation error.
//!
//! Only literal object schemas (`"type": "object"`) are touched. Nodes
//! reached through `$ref`, `allOf`/`anyOf`/`oneOf` or `$defs` are rewritten
//! only where they are themselves literal object schemas in this document;
//! composition keywords are not interpreted.
//!
//! The module also provides [`audit_additional_properties`], a read-only
//! report of the nodes the transform would lock plus those that explicitly
//! allow undeclared properties.

use serde_json::Value;

use crate::walk::{walk, walk_mut};

/// The keyword the transform injects.
pub const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

fn is_object_schema(node: &serde_json::Map<String, Value>) -> bool {
    matches!(node.get("type"), Some(Value::String(t)) if t == "object")
}

/// Return the strict variant of `schema`, leaving `schema` untouched.
pub fn force_additional_properties(schema: &Value) -> Value {
    let mut strict = schema.clone();
    force_additional_properties_in_place(&mut strict);
    strict
}

/// Lock every object schema node of `schema` that has no
/// `additionalProperties` keyword. Returns the labels of the locked nodes.
pub fn force_additional_properties_in_place(schema: &mut Value) -> Vec<String> {
    let mut locked = Vec::new();
    walk_mut(schema, |path, node| {
        if is_object_schema(node) && !node.contains_key(ADDITIONAL_PROPERTIES) {
            tracing::debug!("disabling additional properties for node {path}");
            node.insert(ADDITIONAL_PROPERTIES.to_string(), Value::Bool(false));
            locked.push(path.to_string());
        }
    });
    locked
}

/// An object schema that accepts properties it does not declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalPropertiesFinding {
    /// Label of the object schema node.
    pub json_path: String,
    /// Current value of `additionalProperties`.
    pub current_value: String,
    /// Recommended action.
    pub recommendation: String,
}

impl std::fmt::Display for AdditionalPropertiesFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: additionalProperties = {} ({})",
            self.json_path, self.current_value, self.recommendation
        )
    }
}

/// Report every object schema node whose `additionalProperties` is absent
/// or `true`. A schema-valued `additionalProperties` restricts extra
/// properties and is not reported.
pub fn audit_additional_properties(schema: &Value) -> Vec<AdditionalPropertiesFinding> {
    let mut findings = Vec::new();
    walk(schema, |path, node| {
        if !is_object_schema(node) {
            return;
        }
        match node.get(ADDITIONAL_PROPERTIES) {
            None => findings.push(AdditionalPropertiesFinding {
                json_path: path.to_string(),
                current_value: "(absent, defaults to true)".to_string(),
                recommendation: "locked to false in strict mode".to_string(),
            }),
            Some(Value::Bool(true)) => findings.push(AdditionalPropertiesFinding {
                json_path: path.to_string(),
                current_value: "true".to_string(),
                recommendation: "explicitly open, kept in strict mode".to_string(),
            }),
            Some(_) => {}
        }
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locks_root_object() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}}
        });
        let strict = force_additional_properties(&schema);
        assert_eq!(strict["additionalProperties"], false);
        assert!(strict["properties"]["a"].get("additionalProperties").is_none());
        // The input is not mutated.
        assert!(schema.get("additionalProperties").is_none());
    }

    #[test]
    fn test_locks_nested_and_array_item_objects() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "server": {
                    "type": "object",
                    "properties": {"port": {"type": "integer"}}
                },
                "users": {
                    "type": "array",
                    "items": {"type": "object"}
                }
            },
            "oneOf": [{"type": "object"}, {"type": "string"}]
        });
        let mut locked = force_additional_properties_in_place(&mut schema);
        locked.sort();
        assert_eq!(
            locked,
            vec![
                "/properties/server",
                "/properties/users/items",
                "ROOT",
                "array item of '/oneOf'",
            ]
        );
        assert_eq!(schema["properties"]["server"]["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["users"]["items"]["additionalProperties"],
            false
        );
        assert_eq!(schema["oneOf"][0]["additionalProperties"], false);
        assert!(schema["oneOf"][1].get("additionalProperties").is_none());
        assert!(schema["properties"]["users"]
            .get("additionalProperties")
            .is_none());
    }

    #[test]
    fn test_existing_policy_is_kept() {
        let schema = json!({
            "type": "object",
            "additionalProperties": true,
            "properties": {
                "labels": {
                    "type": "object",
                    "additionalProperties": {"type": "string"}
                }
            }
        });
        let strict = force_additional_properties(&schema);
        assert_eq!(strict, schema);
    }

    #[test]
    fn test_non_literal_object_types_are_untouched() {
        let schema = json!({
            "properties": {
                "nullable": {"type": ["object", "null"]},
                "untyped": {"properties": {"x": {}}},
                "text": {"type": "string"},
                "capital": {"type": "Object"}
            }
        });
        assert_eq!(force_additional_properties(&schema), schema);
    }

    #[test]
    fn test_properties_named_type_are_not_confused_with_keyword() {
        // `type` here is a property declaration, not a type keyword.
        let schema = json!({
            "type": "object",
            "properties": {"type": {"type": "string"}}
        });
        let strict = force_additional_properties(&schema);
        assert_eq!(strict["additionalProperties"], false);
        assert_eq!(strict["properties"], schema["properties"]);
    }

    #[test]
    fn test_boolean_and_scalar_schemas() {
        assert_eq!(force_additional_properties(&json!(true)), json!(true));
        assert_eq!(force_additional_properties(&json!([])), json!([]));
        assert_eq!(
            force_additional_properties(&json!({})),
            json!({}),
            "an empty object schema has no type"
        );
    }

    #[test]
    fn test_audit_reports_absent_and_true() {
        let schema = json!({
            "type": "object",
            "properties": {
                "open": {"type": "object", "additionalProperties": true},
                "locked": {"type": "object", "additionalProperties": false},
                "typed": {"type": "object", "additionalProperties": {"type": "integer"}}
            }
        });
        let findings = audit_additional_properties(&schema);
        assert_eq!(findings.len(), 2, "got: {findings:?}");
        assert_eq!(findings[0].json_path, "ROOT");
        assert_eq!(findings[0].current_value, "(absent, defaults to true)");
        assert_eq!(findings[1].json_path, "/properties/open");
        assert_eq!(findings[1].current_value, "true");
    }

    #[test]
    fn test_audit_of_strict_variant_only_reports_explicit_true() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"type": "object"},
                "b": {"type": "object", "additionalProperties": true}
            }
        });
        let findings = audit_additional_properties(&force_additional_properties(&schema));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].json_path, "/properties/b");
    }

    #[test]
    fn test_finding_display() {
        let finding = AdditionalPropertiesFinding {
            json_path: "/properties/server".to_string(),
            current_value: "true".to_string(),
            recommendation: "explicitly open, kept in strict mode".to_string(),
        };
        let display = finding.to_string();
        assert!(display.starts_with("/properties/server: additionalProperties = true"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// Schema-shaped values: objects mix `type`, `properties`, `items`,
    /// combinators and optional `additionalProperties`.
    fn schema_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(json!({"type": "string"})),
            Just(json!({"type": "integer"})),
            Just(json!({"type": "object"})),
            Just(json!({"type": ["object", "null"]})),
            Just(json!({})),
            Just(json!(true)),
            Just(json!(3)),
        ];
        leaf.prop_recursive(4, 48, 4, |inner| {
            (
                prop::option::of(prop_oneof![
                    Just(json!("object")),
                    Just(json!("array")),
                    Just(json!(["object"])),
                ]),
                prop::option::of(prop_oneof![
                    Just(json!(true)),
                    Just(json!(false)),
                    Just(json!({"type": "string"})),
                ]),
                prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..4),
                prop::collection::vec(inner, 0..3),
            )
                .prop_map(|(ty, additional, properties, one_of)| {
                    let mut node = serde_json::Map::new();
                    if let Some(ty) = ty {
                        node.insert("type".into(), ty);
                    }
                    if let Some(additional) = additional {
                        node.insert(ADDITIONAL_PROPERTIES.into(), additional);
                    }
                    if !properties.is_empty() {
                        node.insert(
                            "properties".into(),
                            Value::Object(properties.into_iter().collect()),
                        );
                    }
                    if !one_of.is_empty() {
                        node.insert("oneOf".into(), Value::Array(one_of));
                    }
                    Value::Object(node)
                })
        })
    }

    /// The `additionalProperties` policy of every object schema, in walk
    /// order.
    fn collect_policies(value: &Value, out: &mut Vec<Option<Value>>) {
        crate::walk::walk(value, |_, node| {
            if is_object_schema(node) {
                out.push(node.get(ADDITIONAL_PROPERTIES).cloned());
            }
        });
    }

    proptest! {
        /// Applying the transform twice equals applying it once.
        #[test]
        fn transform_is_idempotent(schema in schema_value()) {
            let once = force_additional_properties(&schema);
            let twice = force_additional_properties(&once);
            prop_assert_eq!(once, twice);
        }

        /// Every object schema ends up with a policy, and existing policies
        /// survive unchanged.
        #[test]
        fn existing_policies_are_never_overwritten(schema in schema_value()) {
            let strict = force_additional_properties(&schema);
            let mut before = Vec::new();
            let mut after = Vec::new();
            collect_policies(&schema, &mut before);
            collect_policies(&strict, &mut after);
            prop_assert_eq!(before.len(), after.len());
            for (b, a) in before.iter().zip(&after) {
                match b {
                    Some(existing) => prop_assert_eq!(Some(existing), a.as_ref()),
                    None => prop_assert_eq!(a.as_ref(), Some(&Value::Bool(false))),
                }
            }
        }

        /// Only object schemas lacking a policy are locked; the lock count
        /// matches the number of such nodes.
        #[test]
        fn locks_exactly_the_open_object_schemas(schema in schema_value()) {
            let mut before = Vec::new();
            collect_policies(&schema, &mut before);
            let expected = before.iter().filter(|p| p.is_none()).count();
            let mut copy = schema.clone();
            let locked = force_additional_properties_in_place(&mut copy);
            prop_assert_eq!(locked.len(), expected);
        }

        /// A schema that already states every policy is left as is.
        #[test]
        fn fully_specified_schema_is_a_no_op(schema in schema_value()) {
            let strict = force_additional_properties(&schema);
            prop_assert_eq!(force_additional_properties(&strict), strict.clone());
            let mut copy = strict.clone();
            prop_assert!(force_additional_properties_in_place(&mut copy).is_empty());
        }

        /// Apart from `additionalProperties` on object schemas, the tree
        /// is unchanged.
        #[test]
        fn transform_only_adds_policies(schema in schema_value()) {
            let mut strict = force_additional_properties(&schema);
            let mut original = schema.clone();
            strip_policies(&mut strict);
            strip_policies(&mut original);
            prop_assert_eq!(strict, original);
        }
    }

    fn strip_policies(value: &mut Value) {
        crate::walk::walk_mut(value, |_, node| {
            if is_object_schema(node) {
                node.remove(ADDITIONAL_PROPERTIES);
            }
        });
    }
}
