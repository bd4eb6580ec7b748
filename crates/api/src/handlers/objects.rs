//! Save-time validation of object instances.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fieldrules_core::validation::enforcement::validate_object;
use fieldrules_core::validation::failure_channel::{aggregate_message, decode_field_errors};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::response::ObjectValidationResponse;
use crate::state::AppState;

/// Request body for object validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateObjectRequest {
    /// The object's field values keyed by field name. Fields absent here
    /// are not checked.
    #[serde(default)]
    pub values: Map<String, Value>,
    /// Set for drafts and other saves that skip mandatory checks.
    #[serde(default)]
    pub omit_mandatory_check: bool,
    /// Failures the host's own save pipeline already produced, already in
    /// channel form. They lead the aggregate message.
    #[serde(default)]
    pub existing_failures: Vec<String>,
}

/// POST /api/v1/schemas/{schema_id}/objects/validate
///
/// Run the schema's current rules against an object. Returns 200 when the
/// save may proceed and 422 with a `ValidationException` body otherwise.
pub async fn validate(
    State(state): State<AppState>,
    Path(schema_id): Path<String>,
    Json(body): Json<ValidateObjectRequest>,
) -> AppResult<(StatusCode, Json<ObjectValidationResponse>)> {
    let failures = validate_object(
        state.rule_store.as_ref(),
        &schema_id,
        &body.values,
        body.omit_mandatory_check,
    )
    .await?;

    let Some(message) = aggregate_message(&body.existing_failures, &failures) else {
        return Ok((StatusCode::OK, Json(ObjectValidationResponse::passed())));
    };

    tracing::info!(
        schema_id = %schema_id,
        failed = failures.len(),
        "Object save rejected by field rules"
    );
    let field_errors = decode_field_errors(&message);
    Ok((
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ObjectValidationResponse::failed(
            message,
            failures,
            field_errors,
        )),
    ))
}
