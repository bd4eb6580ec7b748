//! Handlers for reading stored field rules.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::RulesResponse;
use crate::state::AppState;

/// Query parameters for the rules read endpoint.
///
/// Older editor builds send the schema id as `classId`.
#[derive(Debug, Deserialize)]
pub struct RulesQuery {
    #[serde(rename = "schemaId", alias = "classId")]
    pub schema_id: Option<String>,
}

/// GET /api/v1/rules?schemaId=X
///
/// Return every stored rule of a schema keyed by field name. Unknown schemas
/// yield an empty map. A missing or blank id is rejected with 400.
pub async fn get_rules(
    State(state): State<AppState>,
    Query(params): Query<RulesQuery>,
) -> AppResult<Json<RulesResponse>> {
    let schema_id = params
        .schema_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing classId".to_string()))?;

    let rules = state.rule_store.get_rules_for_schema(schema_id).await?;
    tracing::debug!(schema_id, count = rules.len(), "Served field rules");

    Ok(Json(RulesResponse {
        success: true,
        rules,
    }))
}
