//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod field_rule_repo;

pub use field_rule_repo::FieldRuleRepo;
