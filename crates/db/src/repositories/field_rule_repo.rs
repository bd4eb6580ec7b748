//! Repository for per-field validation rules.

use fieldrules_core::validation::rules::RuleMap;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::field_rule::FieldRuleRow;

/// Column list for `field_validation_rules` queries.
const COLUMNS: &str = "id, schema_id, field_name, config, created_at, updated_at";

/// Provides replace and lookup operations for field validation rules.
pub struct FieldRuleRepo;

impl FieldRuleRepo {
    /// Replace every rule of a schema in one transaction.
    ///
    /// A transaction-scoped advisory lock keyed by schema serializes
    /// concurrent replaces of the same schema; without it two saves could
    /// both delete the old rows and then collide on the unique constraint.
    /// Dropping the transaction on any error rolls the whole replace back.
    ///
    /// Returns the number of rows written.
    pub async fn replace_for_schema(
        pool: &PgPool,
        schema_id: &str,
        rules: &RuleMap,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(schema_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM field_validation_rules WHERE schema_id = $1")
            .bind(schema_id)
            .execute(&mut *tx)
            .await?;

        let mut written = 0;
        for (field_name, config) in rules {
            sqlx::query(
                "INSERT INTO field_validation_rules \
                    (schema_id, field_name, config, created_at, updated_at) \
                 VALUES ($1, $2, $3, now(), now())",
            )
            .bind(schema_id)
            .bind(field_name)
            .bind(Json(config))
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tx.commit().await?;
        Ok(written)
    }

    /// List all stored rules of a schema, ordered by field name.
    pub async fn list_for_schema(
        pool: &PgPool,
        schema_id: &str,
    ) -> Result<Vec<FieldRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM field_validation_rules \
             WHERE schema_id = $1 ORDER BY field_name"
        );
        sqlx::query_as::<_, FieldRuleRow>(&query)
            .bind(schema_id)
            .fetch_all(pool)
            .await
    }

    /// Find the rule of a single field.
    pub async fn find(
        pool: &PgPool,
        schema_id: &str,
        field_name: &str,
    ) -> Result<Option<FieldRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM field_validation_rules \
             WHERE schema_id = $1 AND field_name = $2"
        );
        sqlx::query_as::<_, FieldRuleRow>(&query)
            .bind(schema_id)
            .bind(field_name)
            .fetch_optional(pool)
            .await
    }

    /// Count stored rules for a schema.
    pub async fn count_for_schema(pool: &PgPool, schema_id: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM field_validation_rules WHERE schema_id = $1")
                .bind(schema_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
