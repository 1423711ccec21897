//! Memoized dispatch tables.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use super::{DispatchError, DispatchTable, MethodDescriptor, MethodRegistry};
use crate::semantics::Semantics;
use crate::value::TypeTag;

type TableResult = Result<Arc<DispatchTable>, DispatchError>;

/// Dispatch tables keyed by (type, semantics).
///
/// Safe to share between threads evaluating concurrently. Each key is built
/// at most once: construction runs while the key's shard is write-locked, so
/// concurrent first lookups of the same key wait for the one build. Failed
/// builds are cached too.
pub struct DispatchCache {
    registry: MethodRegistry,
    tables: DashMap<(TypeTag, Semantics), TableResult>,
    builds: AtomicUsize,
}

impl DispatchCache {
    pub fn new(registry: MethodRegistry) -> Self {
        DispatchCache {
            registry,
            tables: DashMap::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// The process-wide cache over the built-in library.
    pub fn shared() -> Arc<DispatchCache> {
        static SHARED: OnceLock<Arc<DispatchCache>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(DispatchCache::new(MethodRegistry::builtin()))))
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// The table for `tag` under `semantics`, building it on first use.
    pub fn table(&self, tag: TypeTag, semantics: &Semantics) -> TableResult {
        let key = (tag, semantics.clone());
        if let Some(hit) = self.tables.get(&key) {
            return hit.value().clone();
        }
        self.tables
            .entry(key)
            .or_insert_with(|| {
                self.builds.fetch_add(1, Ordering::Relaxed);
                let built = DispatchTable::build(tag, &self.registry, semantics);
                match &built {
                    Ok(table) => debug!(
                        type_name = tag.name(),
                        methods = table.names().len(),
                        "built dispatch table"
                    ),
                    Err(err) => debug!(type_name = tag.name(), %err, "invalid dispatch table"),
                }
                built.map(Arc::new)
            })
            .value()
            .clone()
    }

    /// Look up one method or field.
    pub fn method(
        &self,
        tag: TypeTag,
        semantics: &Semantics,
        name: &str,
    ) -> Result<Option<&'static MethodDescriptor>, DispatchError> {
        Ok(self.table(tag, semantics)?.get(name))
    }

    /// Number of tables built so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
