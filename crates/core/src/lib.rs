//! Field validation rules: configuration types, the rule evaluator,
//! save-time enforcement, and the schema layout tree the editor submits.
//!
//! Nothing in this crate touches the database or the network; storage is
//! reached through the [`validation::store::RuleStore`] trait.

pub mod error;
pub mod layout;
pub mod types;
pub mod validation;
