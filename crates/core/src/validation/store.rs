//! Rule store seam.
//!
//! The save path writes a schema's rules through [`RuleStore`] and
//! enforcement reads them back. The PostgreSQL implementation lives in the
//! db crate; [`MemoryRuleStore`] serves single-process hosts and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::rules::RuleMap;
use crate::error::CoreError;

/// Durable mapping of `(schema_id, field_name)` to rule configuration.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Replace every rule of `schema_id` with `rules`.
    ///
    /// Atomic: readers see either the complete previous set or the complete
    /// new one. An empty map clears the schema. On error the previous set
    /// stays authoritative and [`CoreError::Persistence`] is returned.
    async fn replace_rules_for_schema(
        &self,
        schema_id: &str,
        rules: &RuleMap,
    ) -> Result<(), CoreError>;

    /// Latest committed rules for `schema_id`; empty when none are stored.
    async fn get_rules_for_schema(&self, schema_id: &str) -> Result<RuleMap, CoreError>;
}

/// In-process store. Replacement swaps the whole per-schema map under a
/// write lock, so there is no window in which a reader sees a mix.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    schemas: RwLock<HashMap<String, Arc<RuleMap>>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn replace_rules_for_schema(
        &self,
        schema_id: &str,
        rules: &RuleMap,
    ) -> Result<(), CoreError> {
        let mut schemas = self.schemas.write().await;
        if rules.is_empty() {
            schemas.remove(schema_id);
        } else {
            schemas.insert(schema_id.to_string(), Arc::new(rules.clone()));
        }
        Ok(())
    }

    async fn get_rules_for_schema(&self, schema_id: &str) -> Result<RuleMap, CoreError> {
        let schemas = self.schemas.read().await;
        Ok(schemas
            .get(schema_id)
            .map(|rules| rules.as_ref().clone())
            .unwrap_or_default())
    }
}
