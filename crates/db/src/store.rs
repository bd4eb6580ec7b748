//! [`RuleStore`] backed by PostgreSQL.

use async_trait::async_trait;
use fieldrules_core::error::CoreError;
use fieldrules_core::validation::rules::RuleMap;
use fieldrules_core::validation::store::RuleStore;

use crate::repositories::FieldRuleRepo;
use crate::DbPool;

/// Rule store over the `field_validation_rules` table.
#[derive(Debug, Clone)]
pub struct PgRuleStore {
    pool: DbPool,
}

impl PgRuleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleStore for PgRuleStore {
    async fn replace_rules_for_schema(
        &self,
        schema_id: &str,
        rules: &RuleMap,
    ) -> Result<(), CoreError> {
        let written = FieldRuleRepo::replace_for_schema(&self.pool, schema_id, rules)
            .await
            .map_err(|e| {
                tracing::error!(schema_id, error = %e, "Rule replace rolled back");
                CoreError::Persistence(e.to_string())
            })?;
        tracing::info!(schema_id, count = written, "Replaced field rules");
        Ok(())
    }

    async fn get_rules_for_schema(&self, schema_id: &str) -> Result<RuleMap, CoreError> {
        let rows = FieldRuleRepo::list_for_schema(&self.pool, schema_id)
            .await
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
        rows.iter()
            .map(|row| row.rule().map(|rule| (row.field_name.clone(), rule)))
            .collect()
    }
}
