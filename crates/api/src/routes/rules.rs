//! Route definitions for the `/rules` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// Routes mounted at `/rules`.
///
/// ```text
/// GET    /    -> get_rules   (?schemaId | ?classId)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(rules::get_rules))
}
