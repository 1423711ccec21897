//! Mutable list storage.

use parking_lot::RwLock;

use super::Value;
use crate::errors::{index_out_of_range, EvalError};
use crate::mutability::{Mutability, ObjectId};

/// The storage behind `Value::List`.
///
/// Every mutating method takes the mutability domain of the evaluation doing
/// the mutation and checks it against the list's own domain and locks.
pub struct ListValue {
    id: ObjectId,
    mutability: Mutability,
    items: RwLock<Vec<Value>>,
}

impl ListValue {
    pub(crate) fn new(items: Vec<Value>, mutability: Mutability) -> Self {
        ListValue {
            id: ObjectId::fresh(),
            mutability,
            items: RwLock::new(items),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn mutability(&self) -> &Mutability {
        &self.mutability
    }

    pub fn len(&self) -> usize {
        self.items.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read_recursive().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read_recursive().get(index).cloned()
    }

    /// Snapshot of the current elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.read_recursive().clone()
    }

    /// Run `f` over the elements without copying them.
    ///
    /// Uses a recursive read so that a list reachable from itself can be
    /// inspected while already being read.
    pub fn with_items<R>(&self, f: impl FnOnce(&[Value]) -> R) -> R {
        f(&self.items.read_recursive())
    }

    fn check(&self, active: &Mutability) -> Result<(), EvalError> {
        self.mutability.check_mutable(self.id, active)
    }

    pub fn push(&self, value: Value, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        self.items.write().push(value);
        Ok(())
    }

    /// Append all of `values`. The caller snapshots its source first, so
    /// `xs.extend(xs)` never reads and writes the same lock at once.
    pub fn extend(&self, values: Vec<Value>, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        self.items.write().extend(values);
        Ok(())
    }

    /// Insert before `index`, clamped to `0..=len`.
    pub fn insert(&self, index: usize, value: Value, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        let mut items = self.items.write();
        let index = index.min(items.len());
        items.insert(index, value);
        Ok(())
    }

    pub fn set(&self, index: usize, value: Value, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        let mut items = self.items.write();
        let len = items.len();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(index_out_of_range(
                i64::try_from(index).unwrap_or(i64::MAX),
                len,
            )),
        }
    }

    pub fn remove_at(&self, index: usize, active: &Mutability) -> Result<Value, EvalError> {
        self.check(active)?;
        let mut items = self.items.write();
        if index < items.len() {
            Ok(items.remove(index))
        } else {
            Err(index_out_of_range(
                i64::try_from(index).unwrap_or(i64::MAX),
                items.len(),
            ))
        }
    }

    pub fn clear(&self, active: &Mutability) -> Result<(), EvalError> {
        self.check(active)?;
        self.items.write().clear();
        Ok(())
    }
}
