//! Schema layout tree submitted by the editor.
//!
//! The editor serializes a schema as a tree of JSON nodes. Field nodes carry
//! `"datatype": "data"` and a string `name`; any node may hold `children`.
//! A field's rule rides along as an embedded `pimcoreValidation` object.
//!
//! The tree is handled as plain JSON so unknown editor keys survive a
//! round-trip untouched.

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::validation::rules::{RuleConfiguration, RuleMap};

pub const VALIDATION_KEY: &str = "pimcoreValidation";
pub const CHILDREN_KEY: &str = "children";
const DATATYPE_KEY: &str = "datatype";
const NAME_KEY: &str = "name";
const FIELD_DATATYPE: &str = "data";

/// Name of the field a node describes, if it is a field node.
fn field_name(node: &Map<String, Value>) -> Option<&str> {
    if node.get(DATATYPE_KEY).and_then(Value::as_str) != Some(FIELD_DATATYPE) {
        return None;
    }
    node.get(NAME_KEY).and_then(Value::as_str)
}

/// Pre-order iterator over every field node reachable from a root.
pub struct FieldNodes<'a> {
    stack: Vec<&'a Value>,
}

/// Iterate the field nodes of a layout tree as `(field_name, node)` pairs.
pub fn field_nodes(root: &Value) -> FieldNodes<'_> {
    FieldNodes { stack: vec![root] }
}

impl<'a> Iterator for FieldNodes<'a> {
    type Item = (&'a str, &'a Map<String, Value>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            let Value::Object(map) = node else {
                continue;
            };
            if let Some(Value::Array(children)) = map.get(CHILDREN_KEY) {
                self.stack.extend(children.iter().rev());
            }
            if let Some(name) = field_name(map) {
                return Some((name, map));
            }
        }
        None
    }
}

/// Visit every field node mutably, in the same order as [`field_nodes`].
pub fn for_each_field_node_mut<F>(root: &mut Value, mut visit: F)
where
    F: FnMut(&str, &mut Map<String, Value>),
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let Value::Object(map) = node else {
            continue;
        };
        if let Some(name) = field_name(map).map(str::to_string) {
            visit(&name, map);
        }
        if let Some(Value::Array(children)) = map.get_mut(CHILDREN_KEY) {
            stack.extend(children.iter_mut().rev());
        }
    }
}

/// Extract the rule of every field node that embeds one.
///
/// Fields without an embedded object are simply absent from the result.
/// When a field name occurs twice the later node wins. A malformed rule
/// fails the whole extraction.
pub fn collect_rules(root: &Value) -> Result<RuleMap, CoreError> {
    let mut rules = RuleMap::new();
    for (name, node) in field_nodes(root) {
        let Some(embedded @ Value::Object(_)) = node.get(VALIDATION_KEY) else {
            continue;
        };
        let config = RuleConfiguration::from_json(embedded)
            .map_err(|e| CoreError::Configuration(format!("field '{name}': {e}")))?;
        rules.insert(name.to_string(), config);
    }
    Ok(rules)
}

/// Embed stored rules back into the field nodes of a layout tree, so the
/// editor shows them when a schema is reopened.
///
/// Returns how many field nodes received a rule.
pub fn apply_rules(root: &mut Value, rules: &RuleMap) -> usize {
    let mut applied = 0;
    for_each_field_node_mut(root, |name, node| {
        let Some(config) = rules.get(name) else {
            return;
        };
        if let Ok(embedded) = serde_json::to_value(config) {
            node.insert(VALIDATION_KEY.to_string(), embedded);
            applied += 1;
        }
    });
    applied
}
