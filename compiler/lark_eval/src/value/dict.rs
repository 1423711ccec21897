//! Insertion-ordered dictionaries and hashable keys.

use std::hash::{Hash, Hasher};
use std::mem;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use super::Value;
use crate::errors::{unhashable, EvalError};
use crate::mutability::{Mutability, ObjectId};

/// Entries of a dict, in insertion order.
pub type DictEntries = IndexMap<HashKey, Value, FxBuildHasher>;

/// A value known to be hashable.
///
/// Hashing agrees with value equality: strings, ints and tuples hash by
/// content, functions and depsets by identity.
#[derive(Clone, Debug)]
pub struct HashKey(Value);

impl HashKey {
    pub fn new(value: Value) -> Result<Self, EvalError> {
        if value.is_hashable() {
            Ok(HashKey(value))
        } else {
            Err(unhashable(value.type_name()))
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    mem::discriminant(value).hash(state);
    match value {
        Value::None => {}
        Value::Bool(b) => b.hash(state),
        Value::Int(n) => n.hash(state),
        Value::Str(s) => s.hash(state),
        Value::Tuple(items) => {
            items.len().hash(state);
            for item in items.iter() {
                hash_value(item, state);
            }
        }
        Value::Struct(s) => {
            for (name, field) in s.fields() {
                name.hash(state);
                hash_value(field, state);
            }
        }
        Value::Function(f) => f.addr().hash(state),
        Value::Builtin(b) => b.addr().hash(state),
        Value::Depset(d) => d.addr().hash(state),
        // Never wrapped in a HashKey.
        Value::List(_) | Value::Dict(_) => {}
    }
}

/// The storage behind `Value::Dict`.
pub struct DictValue {
    id: ObjectId,
    mutability: Mutability,
    entries: RwLock<DictEntries>,
}

impl DictValue {
    pub(crate) fn new(entries: DictEntries, mutability: Mutability) -> Self {
        DictValue {
            id: ObjectId::fresh(),
            mutability,
            entries: RwLock::new(entries),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn mutability(&self) -> &Mutability {
        &self.mutability
    }

    pub fn len(&self) -> usize {
        self.entries.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read_recursive().is_empty()
    }

    pub fn get(&self, key: &HashKey) -> Option<Value> {
        self.entries.read_recursive().get(key).cloned()
    }

    /// Look up an arbitrary value, failing if it is unhashable.
    pub fn get_value(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        let key = HashKey::new(key.clone())?;
        Ok(self.get(&key))
    }

    pub fn contains(&self, key: &HashKey) -> bool {
        self.entries.read_recursive().contains_key(key)
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries
            .read_recursive()
            .keys()
            .map(|k| k.value().clone())
            .collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.read_recursive().values().cloned().collect()
    }

    pub fn items(&self) -> Vec<(Value, Value)> {
        self.entries
            .read_recursive()
            .iter()
            .map(|(k, v)| (k.value().clone(), v.clone()))
            .collect()
    }

    /// Snapshot of the entries.
    pub fn to_entries(&self) -> DictEntries {
        self.entries.read_recursive().clone()
    }

    pub fn with_entries<R>(&self, f: impl FnOnce(&DictEntries) -> R) -> R {
        f(&self.entries.read_recursive())
    }

    fn check(&self, active: &Mutability) -> Result<(), EvalError> {
        self.mutability.check_mutable(self.id, active)
    }

    /// Insert or overwrite; an overwritten key keeps its position.
    pub fn insert(&self, key: HashKey, value: Value, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        self.entries.write().insert(key, value);
        Ok(())
    }

    pub fn remove(&self, key: &HashKey, active: &Mutability) -> Result<Option<Value>, EvalError> {
        self.check(active)?;
        Ok(self.entries.write().shift_remove(key))
    }

    pub fn clear(&self, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        self.entries.write().clear();
        Ok(())
    }
}
