//! Route definitions for the `/schemas` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{objects, schemas};
use crate::state::AppState;

/// Routes mounted at `/schemas`.
///
/// ```text
/// PUT    /{schema_id}/layout             -> save_layout
/// GET    /{schema_id}/rules              -> list_rule_rows
/// POST   /{schema_id}/objects/validate   -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{schema_id}/layout", put(schemas::save_layout))
        .route("/{schema_id}/rules", get(schemas::list_rule_rows))
        .route("/{schema_id}/objects/validate", post(objects::validate))
}
