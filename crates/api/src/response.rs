//! Response bodies for the rules API.
//!
//! Every body carries a `success` flag; failures from [`crate::error::AppError`]
//! use the same flag so the editor can branch on one key.

use std::collections::BTreeMap;

use fieldrules_core::validation::rules::{RuleMap, ValidationFailure};
use serde::Serialize;

/// `GET /rules` payload.
#[derive(Debug, Serialize)]
pub struct RulesResponse {
    pub success: bool,
    pub rules: RuleMap,
}

/// Standard `{ "success": true, "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of ingesting a schema layout.
#[derive(Debug, Serialize)]
pub struct LayoutSavedResponse {
    pub success: bool,
    /// Number of fields that now carry a rule (enabled or not).
    pub fields: usize,
    /// Rule problems that did not block the save, such as regex operands
    /// that will never match.
    pub warnings: Vec<String>,
}

/// Outcome of an object-save validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectValidationResponse {
    pub success: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<ValidationFailure>>,
    /// The aggregate message decoded back into per-field messages, the way
    /// the editor highlights form fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ObjectValidationResponse {
    pub const EXCEPTION_TYPE: &'static str = "ValidationException";

    pub fn passed() -> Self {
        Self {
            success: true,
            kind: None,
            message: None,
            failures: None,
            field_errors: None,
        }
    }

    pub fn failed(
        message: String,
        failures: Vec<ValidationFailure>,
        field_errors: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            success: false,
            kind: Some(Self::EXCEPTION_TYPE),
            message: Some(message),
            failures: Some(failures),
            field_errors: Some(field_errors),
        }
    }
}
