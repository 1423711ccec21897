//! Mutability domains.
//!
//! Every list, dict and module created during one evaluation is stamped with
//! the evaluation's [`Mutability`]. An object may be mutated only when
//! - its domain is not frozen,
//! - the mutating evaluation runs in that same domain,
//! - no `for` loop or comprehension currently holds a lock on it.
//!
//! Freezing is terminal. Once a domain is frozen every object it owns is
//! read-only and may be shared with other threads. Mutating an unfrozen object
//! from a foreign domain is a host bug and panics.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use lark_ir::Location;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::{frozen_object, locked_object, EvalError};

static NEXT_OBJECT: AtomicU64 = AtomicU64::new(1);

/// Identity of a mutable object, used as the key for lock bookkeeping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a process-unique id.
    pub fn fresh() -> Self {
        ObjectId(NEXT_OBJECT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Domain {
    label: String,
    frozen: AtomicBool,
    /// Object -> sites currently holding a lock (a multiset).
    locks: Mutex<FxHashMap<ObjectId, Vec<Location>>>,
}

/// A mutability domain shared by all objects created in one evaluation.
#[derive(Clone)]
pub struct Mutability(Arc<Domain>);

impl Mutability {
    /// Create a fresh, unfrozen domain.
    pub fn new(label: impl Into<String>) -> Self {
        Mutability(Arc::new(Domain {
            label: label.into(),
            frozen: AtomicBool::new(false),
            locks: Mutex::new(FxHashMap::default()),
        }))
    }

    /// The shared, permanently frozen domain for values that are born
    /// immutable (host constants, results of constant folding).
    pub fn immutable() -> Self {
        static IMMUTABLE: OnceLock<Mutability> = OnceLock::new();
        IMMUTABLE
            .get_or_init(|| {
                let m = Mutability::new("<immutable>");
                m.0.frozen.store(true, Ordering::Release);
                m
            })
            .clone()
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    /// Freeze the domain. Idempotent; drops all lock bookkeeping.
    pub fn freeze(&self) {
        if !self.0.frozen.swap(true, Ordering::AcqRel) {
            self.0.locks.lock().clear();
            tracing::debug!(domain = %self.0.label, "froze mutability domain");
        }
    }

    pub fn same_domain(&self, other: &Mutability) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Check that `object`, owned by this domain, may be mutated by an
    /// evaluation running in `active`.
    ///
    /// # Panics
    ///
    /// If the object is unfrozen and `active` is a different domain.
    pub fn check_mutable(&self, object: ObjectId, active: &Mutability) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_object());
        }
        if !self.same_domain(active) {
            panic!(
                "trying to mutate an object from a different context \
                 (owned by '{}', mutated from '{}')",
                self.label(),
                active.label()
            );
        }
        let locks = self.0.locks.lock();
        match locks.get(&object) {
            Some(sites) if !sites.is_empty() => Err(locked_object(sites)),
            _ => Ok(()),
        }
    }

    pub fn is_locked(&self, object: ObjectId) -> bool {
        self.0
            .locks
            .lock()
            .get(&object)
            .is_some_and(|sites| !sites.is_empty())
    }

    /// Lock `object` at `site` until the returned guard is dropped.
    ///
    /// Locking an object of a frozen domain is a no-op: it can never be
    /// mutated anyway.
    pub fn lock(&self, object: ObjectId, site: Location) -> ObjectLock {
        if self.is_frozen() {
            return ObjectLock { held: None };
        }
        self.0
            .locks
            .lock()
            .entry(object)
            .or_default()
            .push(site.clone());
        ObjectLock {
            held: Some((self.clone(), object, site)),
        }
    }

    fn unlock(&self, object: ObjectId, site: &Location) {
        let mut locks = self.0.locks.lock();
        if let Some(sites) = locks.get_mut(&object) {
            if let Some(pos) = sites.iter().position(|s| s == site) {
                sites.swap_remove(pos);
            }
            if sites.is_empty() {
                locks.remove(&object);
            }
        }
    }
}

impl fmt::Debug for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutability")
            .field("label", &self.0.label)
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// RAII lock on an object; released on drop, including on error exits.
#[must_use = "the object is unlocked as soon as the guard is dropped"]
pub struct ObjectLock {
    held: Option<(Mutability, ObjectId, Location)>,
}

impl Drop for ObjectLock {
    fn drop(&mut self) {
        if let Some((domain, object, site)) = self.held.take() {
            domain.unlock(object, &site);
        }
    }
}

#[cfg(test)]
mod tests;
