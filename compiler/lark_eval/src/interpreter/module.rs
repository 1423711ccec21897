//! Module globals.

use std::sync::Arc;

use indexmap::IndexMap;
use lark_ir::Name;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use crate::errors::{frozen_global, EvalError};
use crate::mutability::Mutability;
use crate::value::Value;

/// The global bindings of one file, in definition order.
///
/// Globals belong to the module's mutability domain: once it is frozen they
/// can no longer be rebound, and the module may be loaded from other threads.
pub struct Module {
    name: Arc<str>,
    mutability: Mutability,
    globals: RwLock<IndexMap<Name, Value, FxBuildHasher>>,
}

impl Module {
    pub fn new(name: impl Into<Arc<str>>, mutability: Mutability) -> Arc<Module> {
        Arc::new(Module {
            name: name.into(),
            mutability,
            globals: RwLock::new(IndexMap::default()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mutability(&self) -> &Mutability {
        &self.mutability
    }

    pub fn is_frozen(&self) -> bool {
        self.mutability.is_frozen()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.globals.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.globals.read().contains_key(name)
    }

    pub fn set(&self, name: Name, value: Value) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_global(&name, &self.name));
        }
        self.globals.write().insert(name, value);
        Ok(())
    }

    /// Global names in definition order.
    pub fn names(&self) -> Vec<Name> {
        self.globals.read().keys().cloned().collect()
    }

    pub fn bindings(&self) -> Vec<(Name, Value)> {
        self.globals
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Freeze the module's domain, and with it every value it created.
    pub fn freeze(&self) {
        self.mutability.freeze();
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("frozen", &self.is_frozen())
            .finish_non_exhaustive()
    }
}
