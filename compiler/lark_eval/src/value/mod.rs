//! Runtime values.
//!
//! `Value` is a closed sum type; every operator, comparison and attribute
//! lookup matches on it exhaustively.
//!
//! # Heap values
//!
//! Heap variants hold a [`Heap<T>`], an `Arc` with a crate-private
//! constructor, so heap values can only be built through the factory methods
//! below:
//!
//! ```text
//! let s = Value::string("hello");                 // OK
//! let xs = Value::list(vec![], &mutability);      // OK
//! let s = Value::Str(Heap::new(...));             // ERROR outside this crate
//! ```
//!
//! # Mutability
//!
//! Only lists and dicts are mutable. Both are stamped with the domain that
//! created them (see [`crate::mutability`]). Everything else is deeply
//! immutable once built, although a tuple or struct may still contain a
//! mutable list.

mod compare;
mod dict;
mod function;
mod heap;
mod list;
mod repr;
mod scalar_int;
mod structure;

use std::sync::Arc;

use lark_ir::{Location, Name};

pub use compare::{compare, sort_values};
pub use dict::{DictEntries, DictValue, HashKey};
pub use function::{BuiltinFunction, UserFunction};
pub use heap::Heap;
pub use list::ListValue;
pub use scalar_int::ScalarInt;
pub use structure::StructValue;

use crate::depset::Depset;
use crate::errors::{depset_not_iterable, not_iterable, EvalError};
use crate::mutability::{Mutability, ObjectId, ObjectLock};
use crate::semantics::{flags, Semantics};

/// Longest list, tuple or string that `range` and repetition may build.
pub const MAX_SEQUENCE_LENGTH: usize = 1 << 24;

/// Runtime type of a value, and the key of the method dispatch cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    NoneType,
    Bool,
    Int,
    String,
    List,
    Tuple,
    Dict,
    Function,
    Builtin,
    Depset,
    Struct,
    /// Pseudo-type whose methods are the global builtins (`len`, `str`, ...).
    Universe,
}

impl TypeTag {
    /// The name used in error messages and by `type()`.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::NoneType => "NoneType",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::String => "string",
            TypeTag::List => "list",
            TypeTag::Tuple => "tuple",
            TypeTag::Dict => "dict",
            TypeTag::Function => "function",
            TypeTag::Builtin => "builtin_function_or_method",
            TypeTag::Depset => "depset",
            TypeTag::Struct => "struct",
            TypeTag::Universe => "universe",
        }
    }
}

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(ScalarInt),
    Str(Heap<str>),
    List(Heap<ListValue>),
    Tuple(Heap<[Value]>),
    Dict(Heap<DictValue>),
    Function(Heap<UserFunction>),
    Builtin(Heap<BuiltinFunction>),
    Depset(Heap<Depset>),
    Struct(Heap<StructValue>),
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    #[inline]
    pub fn int(value: i64) -> Value {
        Value::Int(ScalarInt::new(value))
    }

    pub fn string(value: &str) -> Value {
        Value::Str(Heap::from_arc(Arc::from(value)))
    }

    pub fn from_string(value: String) -> Value {
        Value::Str(Heap::from_arc(Arc::from(value)))
    }

    /// A new list owned by `mutability`.
    pub fn list(items: Vec<Value>, mutability: &Mutability) -> Value {
        Value::List(Heap::new(ListValue::new(items, mutability.clone())))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Heap::from_arc(Arc::from(items)))
    }

    /// A new dict owned by `mutability`.
    pub fn dict(entries: DictEntries, mutability: &Mutability) -> Value {
        Value::Dict(Heap::new(DictValue::new(entries, mutability.clone())))
    }

    pub fn empty_dict(mutability: &Mutability) -> Value {
        Value::dict(DictEntries::default(), mutability)
    }

    pub fn structure(fields: Vec<(Name, Value)>) -> Value {
        Value::Struct(Heap::new(StructValue::new(fields)))
    }

    pub fn depset(set: Depset) -> Value {
        Value::Depset(Heap::new(set))
    }

    pub(crate) fn function(function: UserFunction) -> Value {
        Value::Function(Heap::new(function))
    }

    pub(crate) fn builtin(builtin: BuiltinFunction) -> Value {
        Value::Builtin(Heap::new(builtin))
    }
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::None => TypeTag::NoneType,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Str(_) => TypeTag::String,
            Value::List(_) => TypeTag::List,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Dict(_) => TypeTag::Dict,
            Value::Function(_) => TypeTag::Function,
            Value::Builtin(_) => TypeTag::Builtin,
            Value::Depset(_) => TypeTag::Depset,
            Value::Struct(_) => TypeTag::Struct,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n.raw()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness: `None`, `False`, `0` and empty collections are false.
    pub fn truth(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.is_empty(),
            Value::Depset(set) => !set.is_empty(),
            Value::Function(_) | Value::Builtin(_) | Value::Struct(_) => true,
        }
    }

    /// Number of elements, for the types `len()` accepts. Counting a depset
    /// flattens it, which fails on one nested too deeply.
    pub fn length(&self) -> Result<Option<usize>, EvalError> {
        Ok(match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(list) => Some(list.len()),
            Value::Tuple(items) => Some(items.len()),
            Value::Dict(dict) => Some(dict.len()),
            Value::Depset(set) => Some(set.to_list()?.len()),
            _ => None,
        })
    }

    /// Whether the value may be a dict key or depset element.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            Value::Struct(s) => s.fields().iter().all(|(_, v)| v.is_hashable()),
            _ => true,
        }
    }

    /// Whether the value can never change: no list or dict of an unfrozen
    /// domain is reachable from it.
    pub fn is_deeply_immutable(&self) -> bool {
        match self {
            Value::List(list) => {
                list.mutability().is_frozen()
                    && list.with_items(|items| items.iter().all(Value::is_deeply_immutable))
            }
            Value::Dict(dict) => {
                dict.mutability().is_frozen()
                    && dict.with_entries(|entries| {
                        entries.values().all(Value::is_deeply_immutable)
                    })
            }
            Value::Tuple(items) => items.iter().all(Value::is_deeply_immutable),
            Value::Struct(s) => s.fields().iter().all(|(_, v)| v.is_deeply_immutable()),
            _ => true,
        }
    }

    /// The elements a `for` loop or comprehension visits: list and tuple
    /// elements, dict keys, and (unless disabled) depset elements.
    pub fn iterate(&self, semantics: &Semantics) -> Result<Vec<Value>, EvalError> {
        match self {
            Value::List(list) => Ok(list.to_vec()),
            Value::Tuple(items) => Ok(items.to_vec()),
            Value::Dict(dict) => Ok(dict.keys()),
            Value::Depset(set) => {
                if semantics.flag(flags::INCOMPATIBLE_DEPSET_IS_NOT_ITERABLE) {
                    Err(depset_not_iterable())
                } else {
                    set.to_list()
                }
            }
            _ => Err(not_iterable(self.type_name())),
        }
    }

    /// Lock a list or dict for the duration of an iteration.
    pub(crate) fn lock_for_iteration(&self, site: &Location) -> Option<ObjectLock> {
        match self {
            Value::List(list) => Some(list.mutability().lock(list.id(), site.clone())),
            Value::Dict(dict) => Some(dict.mutability().lock(dict.id(), site.clone())),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other, &mut Vec::new())
    }
}

/// Containers whose equality is being decided further up the recursion.
/// A pair met again is part of a cycle and compares equal.
type Visiting = Vec<(ObjectId, ObjectId)>;

fn equal(a: &Value, b: &Value, visiting: &mut Visiting) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => **a == **b,
        (Value::List(a), Value::List(b)) => {
            if Heap::ptr_eq(a, b) {
                return true;
            }
            let pair = (a.id(), b.id());
            if visiting.contains(&pair) {
                return true;
            }
            visiting.push(pair);
            let same = lark_stack::ensure_sufficient_stack(|| {
                a.with_items(|x| b.with_items(|y| sequences_equal(x, y, visiting)))
            });
            visiting.pop();
            same
        }
        (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b, visiting),
        (Value::Dict(a), Value::Dict(b)) => {
            if Heap::ptr_eq(a, b) {
                return true;
            }
            let pair = (a.id(), b.id());
            if visiting.contains(&pair) {
                return true;
            }
            visiting.push(pair);
            let same = lark_stack::ensure_sufficient_stack(|| dicts_equal(a, b, visiting));
            visiting.pop();
            same
        }
        (Value::Struct(a), Value::Struct(b)) => {
            Heap::ptr_eq(a, b)
                || (a.fields().len() == b.fields().len()
                    && a.fields().iter().zip(b.fields()).all(|((n, x), (m, y))| {
                        n == m && equal(x, y, visiting)
                    }))
        }
        (Value::Function(a), Value::Function(b)) => Heap::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => Heap::ptr_eq(a, b),
        (Value::Depset(a), Value::Depset(b)) => Heap::ptr_eq(a, b),
        _ => false,
    }
}

fn sequences_equal(x: &[Value], y: &[Value], visiting: &mut Visiting) -> bool {
    x.len() == y.len() && x.iter().zip(y).all(|(p, q)| equal(p, q, visiting))
}

/// Dict equality ignores insertion order.
fn dicts_equal(a: &DictValue, b: &DictValue, visiting: &mut Visiting) -> bool {
    a.with_entries(|x| {
        b.with_entries(|y| {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| equal(v, w, visiting)))
        })
    })
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.repr())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests;
