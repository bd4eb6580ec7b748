pub mod health;
pub mod rules;
pub mod schemas;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
///
/// ```text
/// /rules                                  rule read endpoint
/// /schemas/{schema_id}/layout             schema save ingestion
/// /schemas/{schema_id}/rules              stored rows (diagnostics)
/// /schemas/{schema_id}/objects/validate   object save validation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rules", rules::router())
        .nest("/schemas", schemas::router())
}
