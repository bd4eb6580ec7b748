//! Extension points the host editor calls into.
//!
//! The host owns an [`ExtensionRegistry`] and notifies it synchronously when
//! a schema editor finishes loading, when a field node is added to it, and
//! when an object form opens. Each registered [`EditorExtension`] reacts to
//! the events it cares about. Work that must wait on the network is handed
//! back as a task handle so the host can await it before saving.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fieldrules_core::layout::apply_rules;
use fieldrules_core::validation::rules::RuleMap;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::loader::SchemaRuleLoader;

/// A schema editor's layout tree, shared with extensions that finish
/// decorating it after the editor has opened.
pub type SharedLayout = Arc<Mutex<Value>>;

/// Observer of editor lifecycle events. Every hook defaults to a no-op.
pub trait EditorExtension: Send + Sync {
    /// The schema editor for `schema_id` has built its layout tree.
    ///
    /// Extensions may modify the tree right away. When they need to wait
    /// first they return the handle of the task that will modify it.
    fn editor_loaded(&self, _schema_id: &str, _layout: &SharedLayout) -> Option<JoinHandle<()>> {
        None
    }

    /// A field node was added to the open editor, or its type changed.
    fn node_added(&self, _schema_id: &str, _node: &mut Value) {}

    /// An object form of schema `schema_id` was opened.
    fn object_opened(&self, _schema_id: &str) -> Option<JoinHandle<()>> {
        None
    }
}

/// Extensions registered with the host, notified in registration order.
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn EditorExtension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Arc<dyn EditorExtension>) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Returns the handles of any deferred layout work. The layout must
    /// not be saved before they complete.
    pub fn editor_loaded(&self, schema_id: &str, layout: &SharedLayout) -> Vec<JoinHandle<()>> {
        self.extensions
            .iter()
            .filter_map(|extension| extension.editor_loaded(schema_id, layout))
            .collect()
    }

    pub fn node_added(&self, schema_id: &str, node: &mut Value) {
        for extension in &self.extensions {
            extension.node_added(schema_id, node);
        }
    }

    pub fn object_opened(&self, schema_id: &str) -> Vec<JoinHandle<()>> {
        self.extensions
            .iter()
            .filter_map(|extension| extension.object_opened(schema_id))
            .collect()
    }
}

/// Marker shown next to a form field that has an active rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldIndicator {
    pub field_name: String,
    pub tooltip: String,
}

/// One indicator per enabled rule, in field-name order.
pub fn indicators_for(rules: &RuleMap) -> Vec<FieldIndicator> {
    rules
        .iter()
        .filter(|(_, rule)| rule.enabled)
        .map(|(field_name, rule)| FieldIndicator {
            field_name: field_name.clone(),
            tooltip: format!("Validation: {}", rule.format),
        })
        .collect()
}

type IndicatorMap = HashMap<String, Vec<FieldIndicator>>;

/// Built-in extension wiring stored rules into the editor.
///
/// On editor load it embeds the schema's rules into the layout's field
/// nodes so the rule panel shows them. Cached rules are embedded before the
/// hook returns; otherwise they are fetched and embedded when they arrive,
/// which requires a Tokio runtime. Added nodes get their rule from the cache
/// only. On object open it computes field indicators.
pub struct RuleDecorator {
    loader: SchemaRuleLoader,
    indicators: Arc<Mutex<IndicatorMap>>,
}

impl RuleDecorator {
    pub fn new(loader: SchemaRuleLoader) -> Self {
        Self {
            loader,
            indicators: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Indicators computed for the most recently opened object of a schema.
    pub fn indicators(&self, schema_id: &str) -> Vec<FieldIndicator> {
        lock(&self.indicators)
            .get(schema_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EditorExtension for RuleDecorator {
    fn editor_loaded(&self, schema_id: &str, layout: &SharedLayout) -> Option<JoinHandle<()>> {
        let layout = Arc::clone(layout);
        let id = schema_id.to_string();
        self.loader.load_with(schema_id, move |rules| {
            let applied = apply_rules(&mut lock(&layout), &rules);
            tracing::debug!(schema_id = %id, applied, "Embedded field rules into layout");
        })
    }

    fn node_added(&self, schema_id: &str, node: &mut Value) {
        if let Some(rules) = self.loader.cached(schema_id) {
            apply_rules(node, &rules);
        }
    }

    fn object_opened(&self, schema_id: &str) -> Option<JoinHandle<()>> {
        let indicators = Arc::clone(&self.indicators);
        let id = schema_id.to_string();
        self.loader.load_with(schema_id, move |rules| {
            lock(&indicators).insert(id, indicators_for(&rules));
        })
    }
}
