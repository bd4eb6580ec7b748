//! Save-time enforcement of a schema's rules against one object instance.

use serde_json::{Map, Value};

use super::evaluator::evaluate;
use super::rules::{RuleMap, ValidationFailure};
use super::store::RuleStore;
use crate::error::CoreError;

/// Read access to the fields an object exposes.
pub trait FieldSource {
    /// Current value of `field_name`, or `None` when the object has no such
    /// field. A field that exists but holds nothing is `Some(&Value::Null)`.
    fn field_value(&self, field_name: &str) -> Option<&Value>;
}

impl FieldSource for Map<String, Value> {
    fn field_value(&self, field_name: &str) -> Option<&Value> {
        self.get(field_name)
    }
}

/// Validate an object against the rules currently stored for its schema.
///
/// Rules are always read fresh from `store`. When the schema has no rules
/// the object is not inspected at all. Every failing field is reported; the
/// caller merges the list with whatever else the save pipeline produced.
pub async fn validate_object<S, O>(
    store: &S,
    schema_id: &str,
    object: &O,
    omit_mandatory_check: bool,
) -> Result<Vec<ValidationFailure>, CoreError>
where
    S: RuleStore + ?Sized,
    O: FieldSource + ?Sized,
{
    let rules = store.get_rules_for_schema(schema_id).await?;
    if rules.is_empty() {
        return Ok(Vec::new());
    }
    Ok(validate_fields(&rules, object, omit_mandatory_check))
}

/// Evaluate `rules` against `object` in ascending field-name order.
///
/// Rules for fields the object does not expose are skipped, which tolerates
/// drift between the stored rules and the current schema.
pub fn validate_fields<O>(
    rules: &RuleMap,
    object: &O,
    omit_mandatory_check: bool,
) -> Vec<ValidationFailure>
where
    O: FieldSource + ?Sized,
{
    rules
        .iter()
        .filter_map(|(field_name, config)| {
            let value = object.field_value(field_name)?;
            evaluate(value, config, omit_mandatory_check).map(|v| v.for_field(field_name))
        })
        .collect()
}
