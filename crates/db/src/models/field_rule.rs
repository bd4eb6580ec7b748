//! Models for stored field validation rules.

use fieldrules_core::error::CoreError;
use fieldrules_core::types::{DbId, Timestamp};
use fieldrules_core::validation::rules::RuleConfiguration;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `field_validation_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FieldRuleRow {
    pub id: DbId,
    pub schema_id: String,
    pub field_name: String,
    /// Serialized [`RuleConfiguration`].
    pub config: serde_json::Value,
    pub created_at: Timestamp,
    /// Last time a schema save rewrote this row.
    pub updated_at: Timestamp,
}

impl FieldRuleRow {
    /// Decode the stored configuration.
    ///
    /// Rows are validated before they are written, so a failure here means
    /// the table was edited behind the store's back.
    pub fn rule(&self) -> Result<RuleConfiguration, CoreError> {
        RuleConfiguration::from_json(&self.config).map_err(|e| {
            CoreError::Persistence(format!(
                "stored rule for {}.{} is unreadable: {e}",
                self.schema_id, self.field_name
            ))
        })
    }
}
