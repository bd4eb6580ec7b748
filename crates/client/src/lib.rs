//! Editor-side access to field rules.
//!
//! [`RulesApi`] talks to the rules HTTP service, [`SchemaRuleLoader`] caches
//! and de-duplicates fetches per schema for one editor session, and the
//! [`editor`] module lets the host editor notify registered extensions.

pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod loader;

pub use api::{RuleSource, RulesApi};
pub use config::LoaderConfig;
pub use error::FetchError;
pub use loader::SchemaRuleLoader;
