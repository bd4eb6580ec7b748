//! Integration tests for rule persistence.
//!
//! Exercises `FieldRuleRepo` and `PgRuleStore` against a real database:
//! - Replace / get round-trip
//! - Whole-schema supersede and idempotence
//! - Schema isolation
//! - Rollback when a replace fails midway
//! - Concurrent replaces of one schema

use assert_matches::assert_matches;
use fieldrules_core::error::CoreError;
use fieldrules_core::validation::rules::{RuleConfiguration, RuleFormat, RuleMap};
use fieldrules_core::validation::store::RuleStore;
use fieldrules_db::repositories::FieldRuleRepo;
use fieldrules_db::PgRuleStore;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rule(format: RuleFormat) -> RuleConfiguration {
    RuleConfiguration {
        enabled: true,
        format,
        ..Default::default()
    }
}

fn sample_rules() -> RuleMap {
    let mut rules = RuleMap::new();
    rules.insert("email".to_string(), rule(RuleFormat::Email));
    rules.insert(
        "sku".to_string(),
        RuleConfiguration {
            min_length: Some(3),
            max_length: Some(12),
            message: "SKU must be 3-12 characters".to_string(),
            ..rule(RuleFormat::Length)
        },
    );
    rules.insert(
        "price".to_string(),
        RuleConfiguration {
            required: true,
            min: Some(0.0),
            max: None,
            ..rule(RuleFormat::Range)
        },
    );
    rules.insert(
        "notes".to_string(),
        RuleConfiguration {
            enabled: false,
            ..rule(RuleFormat::Alpha)
        },
    );
    rules
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_schema_has_no_rules(pool: PgPool) {
    let store = PgRuleStore::new(pool);
    assert!(store.get_rules_for_schema("missing").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_then_get_round_trips(pool: PgPool) {
    let store = PgRuleStore::new(pool);
    let rules = sample_rules();

    store.replace_rules_for_schema("products", &rules).await.unwrap();

    let stored = store.get_rules_for_schema("products").await.unwrap();
    assert_eq!(stored, rules);
    assert!(!stored["notes"].enabled, "disabled rules are persisted");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_supersedes_previous_set(pool: PgPool) {
    let store = PgRuleStore::new(pool.clone());
    store
        .replace_rules_for_schema("products", &sample_rules())
        .await
        .unwrap();

    let mut next = RuleMap::new();
    next.insert("title".to_string(), rule(RuleFormat::Alphanumeric));
    store.replace_rules_for_schema("products", &next).await.unwrap();

    assert_eq!(store.get_rules_for_schema("products").await.unwrap(), next);
    assert_eq!(
        FieldRuleRepo::count_for_schema(&pool, "products").await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_is_idempotent(pool: PgPool) {
    let store = PgRuleStore::new(pool.clone());
    let rules = sample_rules();

    store.replace_rules_for_schema("products", &rules).await.unwrap();
    store.replace_rules_for_schema("products", &rules).await.unwrap();

    assert_eq!(store.get_rules_for_schema("products").await.unwrap(), rules);
    assert_eq!(
        FieldRuleRepo::count_for_schema(&pool, "products").await.unwrap(),
        rules.len() as i64
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_replace_clears_only_that_schema(pool: PgPool) {
    let store = PgRuleStore::new(pool);
    store
        .replace_rules_for_schema("products", &sample_rules())
        .await
        .unwrap();
    store
        .replace_rules_for_schema("customers", &sample_rules())
        .await
        .unwrap();

    store
        .replace_rules_for_schema("products", &RuleMap::new())
        .await
        .unwrap();

    assert!(store.get_rules_for_schema("products").await.unwrap().is_empty());
    assert_eq!(
        store.get_rules_for_schema("customers").await.unwrap(),
        sample_rules()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rows_are_listed_by_field_name_with_timestamps(pool: PgPool) {
    FieldRuleRepo::replace_for_schema(&pool, "products", &sample_rules())
        .await
        .unwrap();

    let rows = FieldRuleRepo::list_for_schema(&pool, "products").await.unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.field_name.as_str()).collect();
    assert_eq!(names, vec!["email", "notes", "price", "sku"]);
    assert!(rows.iter().all(|r| r.updated_at >= r.created_at));
    assert_eq!(rows[0].config["format"], "email");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_single_field(pool: PgPool) {
    FieldRuleRepo::replace_for_schema(&pool, "products", &sample_rules())
        .await
        .unwrap();

    let row = FieldRuleRepo::find(&pool, "products", "sku")
        .await
        .unwrap()
        .expect("sku rule should exist");
    assert_eq!(row.rule().unwrap().max_length, Some(12));

    assert!(FieldRuleRepo::find(&pool, "products", "nope")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unreadable_row_surfaces_as_persistence_error(pool: PgPool) {
    sqlx::query(
        "INSERT INTO field_validation_rules (schema_id, field_name, config) VALUES ($1, $2, $3)",
    )
    .bind("products")
    .bind("legacy")
    .bind(json!({"format": "postcode"}))
    .execute(&pool)
    .await
    .unwrap();

    let store = PgRuleStore::new(pool);
    assert_matches!(
        store.get_rules_for_schema("products").await,
        Err(CoreError::Persistence(_))
    );
}

/// Install a trigger that rejects inserts for one field name, so a replace
/// fails partway through its transaction.
async fn reject_inserts_of(pool: &PgPool, field_name: &str) {
    sqlx::query(&format!(
        "CREATE FUNCTION reject_field_insert() RETURNS trigger AS $$ \
         BEGIN \
             IF NEW.field_name = '{field_name}' THEN \
                 RAISE EXCEPTION 'insert rejected for %', NEW.field_name; \
             END IF; \
             RETURN NEW; \
         END $$ LANGUAGE plpgsql"
    ))
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TRIGGER trg_reject_field_insert BEFORE INSERT ON field_validation_rules \
         FOR EACH ROW EXECUTE FUNCTION reject_field_insert()",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_replace_rolls_back_to_previous_set(pool: PgPool) {
    let store = PgRuleStore::new(pool.clone());
    store
        .replace_rules_for_schema("products", &sample_rules())
        .await
        .unwrap();

    reject_inserts_of(&pool, "zz_broken").await;

    // "alpha" is inserted before "zz_broken", so the failure happens after
    // the delete and at least one insert have run.
    let mut next = RuleMap::new();
    next.insert("alpha".to_string(), rule(RuleFormat::Alpha));
    next.insert("zz_broken".to_string(), rule(RuleFormat::Email));

    assert_matches!(
        store.replace_rules_for_schema("products", &next).await,
        Err(CoreError::Persistence(_))
    );

    assert_eq!(
        store.get_rules_for_schema("products").await.unwrap(),
        sample_rules(),
        "previous rule set must survive a failed replace"
    );
    assert_eq!(
        FieldRuleRepo::count_for_schema(&pool, "products").await.unwrap(),
        sample_rules().len() as i64
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_replaces_leave_one_complete_set(pool: PgPool) {
    let store = PgRuleStore::new(pool);

    let mut first = RuleMap::new();
    first.insert("a".to_string(), rule(RuleFormat::Email));
    first.insert("b".to_string(), rule(RuleFormat::Phone));
    let mut second = RuleMap::new();
    second.insert("b".to_string(), rule(RuleFormat::Numeric));
    second.insert("c".to_string(), rule(RuleFormat::Alpha));

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let rules = if i % 2 == 0 { first.clone() } else { second.clone() };
        handles.push(tokio::spawn(async move {
            store.replace_rules_for_schema("race", &rules).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.get_rules_for_schema("race").await.unwrap();
    assert!(
        stored == first || stored == second,
        "final state must be exactly one submitted set, got {stored:?}"
    );
}
