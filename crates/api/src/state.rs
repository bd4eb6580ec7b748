use std::sync::Arc;

use fieldrules_core::validation::store::RuleStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fieldrules_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Where schema rules are replaced on layout save and read at object save.
    pub rule_store: Arc<dyn RuleStore>,
}

impl AppState {
    /// State backed by PostgreSQL for both the pool and the rule store.
    pub fn new(pool: fieldrules_db::DbPool, config: ServerConfig) -> Self {
        let rule_store = Arc::new(fieldrules_db::PgRuleStore::new(pool.clone()));
        Self {
            pool,
            config: Arc::new(config),
            rule_store,
        }
    }
}
