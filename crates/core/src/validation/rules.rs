//! Rule configuration and failure types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Rules for every configured field of one schema, keyed by field name.
///
/// Iteration is in ascending field-name order, which keeps enforcement output
/// deterministic.
pub type RuleMap = BTreeMap<String, RuleConfiguration>;

/// Content check selected by a rule. Independent of the `required` flag.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RuleFormat {
    #[default]
    None,
    Email,
    Phone,
    Regex,
    Alpha,
    Alphanumeric,
    Numeric,
    Length,
    Range,
}

impl RuleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Regex => "regex",
            Self::Alpha => "alpha",
            Self::Alphanumeric => "alphanumeric",
            Self::Numeric => "numeric",
            Self::Length => "length",
            Self::Range => "range",
        }
    }

    /// Formats checked against the value's textual form.
    pub fn is_string_check(&self) -> bool {
        matches!(
            self,
            Self::Email
                | Self::Phone
                | Self::Regex
                | Self::Alpha
                | Self::Alphanumeric
                | Self::Numeric
                | Self::Length
        )
    }
}

impl fmt::Display for RuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation rule attached to a single schema field.
///
/// This is also the wire shape exchanged with the editor, so field names are
/// camelCase and every key is always serialized (absent bounds as `null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfiguration {
    /// Master switch. Disabled rules are stored but never evaluated.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
    #[serde(default, deserialize_with = "nullable_format")]
    pub format: RuleFormat,
    /// Pattern body without delimiters, matched unanchored.
    #[serde(default, deserialize_with = "nullable_string")]
    pub regex: String,
    #[serde(default, deserialize_with = "lenient_length")]
    pub min_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_length")]
    pub max_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max: Option<f64>,
    /// Custom error text. Empty means the built-in message of the failing check.
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
}

impl RuleConfiguration {
    /// Parse a configuration from its JSON form.
    ///
    /// Any shape problem (unknown format, non-numeric bound, negative length)
    /// is reported as [`CoreError::Configuration`].
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        Self::deserialize(value).map_err(|e| CoreError::Configuration(e.to_string()))
    }

    /// The custom message, if one is set after trimming.
    pub fn custom_message(&self) -> Option<&str> {
        let message = self.message.trim();
        (!message.is_empty()).then_some(message)
    }

    /// Compile error for an enabled `regex` rule whose pattern cannot be used.
    ///
    /// Evaluation treats such a pattern as "does not match"; this lets the
    /// save path warn the administrator up front.
    pub fn pattern_error(&self) -> Option<String> {
        if !self.enabled || self.format != RuleFormat::Regex {
            return None;
        }
        let pattern = self.regex.trim();
        if pattern.is_empty() {
            return None;
        }
        super::evaluator::compile_pattern(pattern)
            .err()
            .map(|e| e.to_string())
    }
}

/// A failing field, produced by enforcement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub field_name: String,
    pub message: String,
}

/// Which check a value failed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleCheck {
    Required,
    Email,
    Phone,
    Alpha,
    Alphanumeric,
    Numeric,
    MinLength,
    MaxLength,
    Pattern,
    NotNumeric,
    MinValue,
    MaxValue,
}

/// Outcome of a failed evaluation, before it is attributed to a field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RuleViolation {
    pub check: RuleCheck,
    pub message: String,
}

impl RuleViolation {
    pub fn for_field(self, field_name: impl Into<String>) -> ValidationFailure {
        ValidationFailure {
            field_name: field_name.into(),
            message: self.message,
        }
    }
}

/// Parse every entry of a `{fieldName: config}` JSON object.
///
/// The first malformed entry rejects the whole map.
pub fn rule_map_from_json(value: &Value) -> Result<RuleMap, CoreError> {
    let Value::Object(entries) = value else {
        return Err(CoreError::Configuration(
            "rules must be a JSON object keyed by field name".to_string(),
        ));
    };
    entries
        .iter()
        .map(|(field, config)| {
            RuleConfiguration::from_json(config)
                .map(|config| (field.clone(), config))
                .map_err(|e| CoreError::Configuration(format!("field '{field}': {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lenient wire decoding
// ---------------------------------------------------------------------------

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}

fn nullable_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn nullable_format<'de, D: Deserializer<'de>>(d: D) -> Result<RuleFormat, D::Error> {
    Ok(Option::<RuleFormat>::deserialize(d)?.unwrap_or_default())
}

/// Numbers, numeric strings, `""` and `null` are accepted; blanks mean unset.
fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    use serde::de::Error;

    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("bound {n} is not a finite number"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => super::evaluator::parse_numeric(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("bound '{s}' is not numeric"))),
        Some(other) => Err(D::Error::custom(format!(
            "bound must be a number, got {other}"
        ))),
    }
}

fn lenient_length<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    use serde::de::Error;

    let Some(n) = lenient_number(d)? else {
        return Ok(None);
    };
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!(
            "length bound must be a non-negative integer, got {n}"
        )));
    }
    Ok(Some(n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn missing_keys_use_defaults() {
        let config = RuleConfiguration::from_json(&json!({})).unwrap();
        assert_eq!(config, RuleConfiguration::default());
        assert_eq!(config.format, RuleFormat::None);
    }

    #[test]
    fn full_payload_decodes() {
        let config = RuleConfiguration::from_json(&json!({
            "enabled": true,
            "required": true,
            "format": "length",
            "regex": "",
            "minLength": 3,
            "maxLength": 5,
            "min": null,
            "max": null,
            "message": ""
        }))
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.format, RuleFormat::Length);
        assert_eq!(config.min_length, Some(3));
        assert_eq!(config.max_length, Some(5));
        assert_eq!(config.min, None);
    }

    #[test]
    fn numeric_strings_and_blanks_are_accepted() {
        let config = RuleConfiguration::from_json(&json!({
            "format": "range",
            "min": "1.5",
            "max": "",
            "minLength": "4",
            "regex": null,
            "message": null
        }))
        .unwrap();
        assert_eq!(config.min, Some(1.5));
        assert_eq!(config.max, None);
        assert_eq!(config.min_length, Some(4));
        assert_eq!(config.regex, "");
    }

    #[test]
    fn unknown_format_is_a_configuration_error() {
        let err = RuleConfiguration::from_json(&json!({"format": "zipcode"})).unwrap_err();
        assert_matches!(err, CoreError::Configuration(_));
    }

    #[test]
    fn negative_length_is_rejected() {
        let err = RuleConfiguration::from_json(&json!({"minLength": -1})).unwrap_err();
        assert_matches!(err, CoreError::Configuration(_));
    }

    #[test]
    fn non_numeric_bound_is_rejected() {
        let err = RuleConfiguration::from_json(&json!({"max": "ten"})).unwrap_err();
        assert_matches!(err, CoreError::Configuration(_));
    }

    #[test]
    fn serializes_every_key_in_camel_case() {
        let value = serde_json::to_value(RuleConfiguration {
            enabled: true,
            format: RuleFormat::Alphanumeric,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "enabled": true,
                "required": false,
                "format": "alphanumeric",
                "regex": "",
                "minLength": null,
                "maxLength": null,
                "min": null,
                "max": null,
                "message": ""
            })
        );
    }

    #[test]
    fn rule_map_reports_the_offending_field() {
        let err = rule_map_from_json(&json!({
            "name": {"enabled": true},
            "email": {"format": 42}
        }))
        .unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("email"));
    }

    #[test]
    fn pattern_error_only_for_enabled_regex_rules() {
        let mut config = RuleConfiguration {
            enabled: true,
            format: RuleFormat::Regex,
            regex: "[0-9".to_string(),
            ..Default::default()
        };
        assert!(config.pattern_error().is_some());

        config.enabled = false;
        assert!(config.pattern_error().is_none());

        config.enabled = true;
        config.regex = "^[0-9]{4}$".to_string();
        assert!(config.pattern_error().is_none());
    }

    #[test]
    fn custom_message_is_trimmed() {
        let config = RuleConfiguration {
            message: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.custom_message(), None);

        let config = RuleConfiguration {
            message: " Bad value ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.custom_message(), Some("Bad value"));
    }
}
