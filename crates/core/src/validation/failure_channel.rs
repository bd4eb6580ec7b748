//! Encoding of validation failures into the host's error-message channel.
//!
//! The host reports a failed object save as one aggregate message. Each
//! failure becomes a segment `"<message> fieldname=<field>"`; segments are
//! joined with `" / "` after a `"Validation failed: "` prefix. The editor
//! parses the suffix back out to mark the offending form field.
//!
//! The format is frozen. It is ambiguous when a message itself contains
//! `fieldname=`: decoding always splits at the last occurrence.

use std::collections::BTreeMap;

use super::rules::ValidationFailure;

pub const FIELD_MARKER: &str = "fieldname=";
pub const SEGMENT_SEPARATOR: &str = " / ";
pub const AGGREGATE_PREFIX: &str = "Validation failed: ";

/// Encode a single failure as a channel segment.
pub fn encode_failure(failure: &ValidationFailure) -> String {
    format!("{} {FIELD_MARKER}{}", failure.message, failure.field_name)
}

/// Build the aggregate message from failures the host already collected
/// (already-encoded segments) followed by `failures`.
///
/// Returns `None` when there is nothing to report.
pub fn aggregate_message(existing: &[String], failures: &[ValidationFailure]) -> Option<String> {
    let segments: Vec<String> = existing
        .iter()
        .cloned()
        .chain(failures.iter().map(encode_failure))
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(format!("{AGGREGATE_PREFIX}{}", segments.join(SEGMENT_SEPARATOR)))
}

/// Decode an aggregate message into `field name -> messages`.
///
/// Segments without a field marker or with a blank field name are ignored.
/// A field whose segment carries no message text still appears, with no
/// messages, so the caller knows it was flagged.
pub fn decode_field_errors(message: &str) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for segment in message.split(SEGMENT_SEPARATOR) {
        let Some(idx) = segment.rfind(FIELD_MARKER) else {
            continue;
        };
        let field_name = segment[idx + FIELD_MARKER.len()..].trim();
        if field_name.is_empty() {
            continue;
        }
        let text = strip_aggregate_prefix(&segment[..idx]).trim();

        let messages = result.entry(field_name.to_string()).or_default();
        if !text.is_empty() {
            messages.push(text.to_string());
        }
    }

    result
}

/// Strip a leading `"Validation failed:"` (any case, any following spaces).
fn strip_aggregate_prefix(text: &str) -> &str {
    let prefix = AGGREGATE_PREFIX.trim_end();
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => text[prefix.len()..].trim_start(),
        _ => text,
    }
}
