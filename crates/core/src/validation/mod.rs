//! Field validation engine.
//!
//! Provides the rule configuration types, a pure evaluator, save-time
//! enforcement over a [`store::RuleStore`], and the codec for the host's
//! failure-message channel.

pub mod enforcement;
pub mod evaluator;
pub mod failure_channel;
pub mod rules;
pub mod store;
