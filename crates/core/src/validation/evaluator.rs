//! Rule evaluator. Pure logic, no database access.
//!
//! [`evaluate`] never fails: malformed input (including an uncompilable
//! pattern operand) always comes back as either `None` or a violation.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use validator::ValidateEmail;

use super::rules::{RuleCheck, RuleConfiguration, RuleFormat, RuleViolation};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MSG_REQUIRED: &str = "This field is required";
pub const MSG_EMAIL: &str = "Invalid email address";
pub const MSG_PHONE: &str = "Invalid phone number";
pub const MSG_ALPHA: &str = "Only letters are allowed";
pub const MSG_ALPHANUMERIC: &str = "Only letters and numbers are allowed";
pub const MSG_NUMERIC: &str = "Only numeric values are allowed";
pub const MSG_PATTERN: &str = "Invalid format";
pub const MSG_NOT_NUMERIC: &str = "Invalid numeric value";

/// Upper bound on the compiled size of an administrator-supplied pattern.
/// Patterns over the limit fail to compile and therefore never match.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]{6,}$").expect("valid regex"));
// Character classes are ASCII-only: `\d` and `\s` would match any Unicode
// digit or space.
static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z \t\n\r\x0B\x0C]+$").expect("valid regex"));
static ALPHANUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 \t\n\r\x0B\x0C]+$").expect("valid regex"));
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid regex"));
/// Decimal or exponent literal, as accepted for numeric coercion of strings.
static NUMBER_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate one field value against its rule.
///
/// Checks run in a fixed order and stop at the first failure: the required
/// check, then the content check selected by `config.format`. Empty values
/// only ever fail the required check.
pub fn evaluate(
    value: &Value,
    config: &RuleConfiguration,
    omit_mandatory_check: bool,
) -> Option<RuleViolation> {
    if !config.enabled {
        return None;
    }

    let empty = is_empty(value);
    if config.required && !omit_mandatory_check && empty {
        return Some(violation(config, RuleCheck::Required, MSG_REQUIRED.to_string()));
    }
    if empty {
        return None;
    }

    if config.format.is_string_check() {
        let text = string_value(value)?;
        return evaluate_string(config, &text);
    }

    if config.format == RuleFormat::Range {
        return evaluate_range(config, numeric_value(value));
    }

    None
}

fn evaluate_string(config: &RuleConfiguration, text: &str) -> Option<RuleViolation> {
    let (check, default) = match config.format {
        RuleFormat::Email if !text.validate_email() => (RuleCheck::Email, MSG_EMAIL),
        RuleFormat::Phone if !PHONE_RE.is_match(text) => (RuleCheck::Phone, MSG_PHONE),
        RuleFormat::Alpha if !ALPHA_RE.is_match(text) => (RuleCheck::Alpha, MSG_ALPHA),
        RuleFormat::Alphanumeric if !ALPHANUMERIC_RE.is_match(text) => {
            (RuleCheck::Alphanumeric, MSG_ALPHANUMERIC)
        }
        RuleFormat::Numeric if !NUMERIC_RE.is_match(text) => (RuleCheck::Numeric, MSG_NUMERIC),
        RuleFormat::Length => return evaluate_length(config, text),
        RuleFormat::Regex if !pattern_matches(&config.regex, text) => {
            (RuleCheck::Pattern, MSG_PATTERN)
        }
        _ => return None,
    };
    Some(violation(config, check, default.to_string()))
}

fn evaluate_length(config: &RuleConfiguration, text: &str) -> Option<RuleViolation> {
    let len = text.chars().count();
    if let Some(min) = config.min_length.filter(|&m| m > 0) {
        if len < min as usize {
            return Some(violation(
                config,
                RuleCheck::MinLength,
                format!("Minimum length is {min}"),
            ));
        }
    }
    if let Some(max) = config.max_length.filter(|&m| m > 0) {
        if len > max as usize {
            return Some(violation(
                config,
                RuleCheck::MaxLength,
                format!("Maximum length is {max}"),
            ));
        }
    }
    None
}

fn evaluate_range(config: &RuleConfiguration, number: Option<f64>) -> Option<RuleViolation> {
    let Some(number) = number else {
        return Some(violation(
            config,
            RuleCheck::NotNumeric,
            MSG_NOT_NUMERIC.to_string(),
        ));
    };
    if let Some(min) = config.min {
        if number < min {
            return Some(violation(
                config,
                RuleCheck::MinValue,
                format!("Minimum value is {min}"),
            ));
        }
    }
    if let Some(max) = config.max {
        if number > max {
            return Some(violation(
                config,
                RuleCheck::MaxValue,
                format!("Maximum value is {max}"),
            ));
        }
    }
    None
}

/// A blank pattern imposes no constraint; an unusable one never matches.
fn pattern_matches(pattern: &str, text: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return true;
    }
    match compile_pattern(pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// Compile an administrator-supplied pattern with default flags and a
/// bounded program size.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(PATTERN_SIZE_LIMIT)
        .dfa_size_limit(PATTERN_SIZE_LIMIT)
        .build()
}

fn violation(config: &RuleConfiguration, check: RuleCheck, default: String) -> RuleViolation {
    let message = config
        .custom_message()
        .map(str::to_string)
        .unwrap_or(default);
    RuleViolation { check, message }
}

// ---------------------------------------------------------------------------
// Value coercion
// ---------------------------------------------------------------------------

/// `null`, blank strings, and empty arrays/objects count as "no value".
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Trimmed textual form of a scalar; `None` for arrays and objects.
fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integers print as-is; floats print in shortest form (`5.0` -> `5`).
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Parse a numeric-looking string (surrounding whitespace ignored).
///
/// Only decimal and exponent literals qualify; `inf`, `NaN` and hex do not.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    if !NUMBER_LITERAL_RE.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
