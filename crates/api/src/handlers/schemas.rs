//! Handlers for schema-level rule ingestion and diagnostics.

use axum::extract::{Path, State};
use axum::Json;
use fieldrules_core::layout::collect_rules;
use fieldrules_db::models::field_rule::FieldRuleRow;
use fieldrules_db::repositories::FieldRuleRepo;
use serde_json::Value;

use crate::error::AppResult;
use crate::response::{DataResponse, LayoutSavedResponse};
use crate::state::AppState;

/// PUT /api/v1/schemas/{schema_id}/layout
///
/// Ingest the editor's layout tree on schema save: every field node's
/// embedded rule is extracted and the schema's rule set is replaced as a
/// whole, so fields that lost their rule are cleared. One malformed rule
/// rejects the save and nothing is written.
pub async fn save_layout(
    State(state): State<AppState>,
    Path(schema_id): Path<String>,
    Json(layout): Json<Value>,
) -> AppResult<Json<LayoutSavedResponse>> {
    let rules = collect_rules(&layout)?;

    let warnings: Vec<String> = rules
        .iter()
        .filter_map(|(field, rule)| {
            rule.pattern_error()
                .map(|err| format!("field '{field}': regex never matches: {err}"))
        })
        .collect();
    for warning in &warnings {
        tracing::warn!(schema_id = %schema_id, %warning, "Unusable rule pattern");
    }

    state
        .rule_store
        .replace_rules_for_schema(&schema_id, &rules)
        .await?;

    Ok(Json(LayoutSavedResponse {
        success: true,
        fields: rules.len(),
        warnings,
    }))
}

/// GET /api/v1/schemas/{schema_id}/rules
///
/// Raw stored rows, including timestamps, for diagnosing what a save wrote.
pub async fn list_rule_rows(
    State(state): State<AppState>,
    Path(schema_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<FieldRuleRow>>>> {
    let rows = FieldRuleRepo::list_for_schema(&state.pool, &schema_id).await?;
    Ok(Json(DataResponse::new(rows)))
}
