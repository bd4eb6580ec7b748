//! Per-session cache of schema rules with shared in-flight fetches.
//!
//! The editor asks for a schema's rules every time a form opens. The loader
//! fetches each schema at most once at a time: callers that arrive while a
//! fetch is running join it instead of starting another. A successful result
//! is kept for the rest of the session. A failed fetch resolves to an empty
//! map for everyone waiting on it and is not cached, so the next call
//! retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fieldrules_core::validation::rules::RuleMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;

use crate::api::RuleSource;
use crate::error::FetchError;

type SharedFetch = Shared<BoxFuture<'static, Arc<RuleMap>>>;

enum Slot {
    Ready(Arc<RuleMap>),
    Pending { generation: u64, fetch: SharedFetch },
}

struct Inner {
    source: Arc<dyn RuleSource>,
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: AtomicU64,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the outcome of the fetch tagged `generation`.
    fn settle(
        &self,
        schema_id: &str,
        generation: u64,
        result: Result<RuleMap, FetchError>,
    ) -> Arc<RuleMap> {
        let mut slots = self.slots();
        match result {
            Ok(rules) => {
                let rules = Arc::new(rules);
                tracing::debug!(schema_id, count = rules.len(), "Loaded field rules");
                slots.insert(schema_id.to_string(), Slot::Ready(Arc::clone(&rules)));
                rules
            }
            Err(e) => {
                tracing::warn!(schema_id, error = %e, "Failed to load field rules");
                if matches!(
                    slots.get(schema_id),
                    Some(Slot::Pending { generation: g, .. }) if *g == generation
                ) {
                    slots.remove(schema_id);
                }
                Arc::new(RuleMap::new())
            }
        }
    }
}

/// Caches schema rules for one editor session.
///
/// Cloning is cheap; clones share the cache.
#[derive(Clone)]
pub struct SchemaRuleLoader {
    inner: Arc<Inner>,
}

enum Lookup {
    Ready(Arc<RuleMap>),
    Pending(SharedFetch),
}

impl SchemaRuleLoader {
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                slots: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Rules of `schema_id`, from the cache or a (possibly shared) fetch.
    ///
    /// Never fails: a fetch error yields an empty map.
    pub async fn load(&self, schema_id: &str) -> Arc<RuleMap> {
        match self.lookup(schema_id) {
            Lookup::Ready(rules) => rules,
            Lookup::Pending(fetch) => fetch.await,
        }
    }

    /// Callback flavour of [`load`](Self::load).
    ///
    /// With cached rules `on_ready` runs before this returns and `None` is
    /// returned. Otherwise the wait happens on a spawned task, whose handle
    /// is returned. Must be called from within a Tokio runtime.
    pub fn load_with<F>(&self, schema_id: &str, on_ready: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Arc<RuleMap>) + Send + 'static,
    {
        match self.lookup(schema_id) {
            Lookup::Ready(rules) => {
                on_ready(rules);
                None
            }
            Lookup::Pending(fetch) => Some(tokio::spawn(async move {
                on_ready(fetch.await);
            })),
        }
    }

    /// Cached rules, without fetching.
    pub fn cached(&self, schema_id: &str) -> Option<Arc<RuleMap>> {
        match self.inner.slots().get(schema_id) {
            Some(Slot::Ready(rules)) => Some(Arc::clone(rules)),
            _ => None,
        }
    }

    /// Forget a schema so the next load fetches again.
    ///
    /// Callers already waiting on a running fetch still get its result, and
    /// a successful one is cached when it lands.
    pub fn invalidate(&self, schema_id: &str) {
        if self.inner.slots().remove(schema_id).is_some() {
            tracing::debug!(schema_id, "Invalidated cached field rules");
        }
    }

    fn lookup(&self, schema_id: &str) -> Lookup {
        let mut slots = self.inner.slots();
        match slots.get(schema_id) {
            Some(Slot::Ready(rules)) => return Lookup::Ready(Arc::clone(rules)),
            Some(Slot::Pending { fetch, .. }) => return Lookup::Pending(fetch.clone()),
            None => {}
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let id = schema_id.to_string();
        let fetch = async move {
            let result = inner.source.fetch_rules(&id).await;
            inner.settle(&id, generation, result)
        }
        .boxed()
        .shared();

        slots.insert(
            schema_id.to_string(),
            Slot::Pending {
                generation,
                fetch: fetch.clone(),
            },
        );
        Lookup::Pending(fetch)
    }
}
