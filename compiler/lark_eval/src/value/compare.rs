//! Total ordering used by `<`, `sorted`, `min` and `max`.

use std::cmp::Ordering;

use super::Value;
use crate::errors::{cannot_compare, cannot_compare_kind, EvalError};
use crate::mutability::ObjectId;

/// Compare two values.
///
/// Ints, strings and bools compare natively. Lists compare with lists and
/// tuples with tuples, lexicographically by element and then by length.
/// Structs and depsets are never ordered; every other pairing of types is an
/// error. Lists that contain themselves cannot be ordered once the
/// comparison reaches the cycle.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    compare_in(a, b, &mut Vec::new())
}

fn compare_in(
    a: &Value,
    b: &Value,
    visiting: &mut Vec<(ObjectId, ObjectId)>,
) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok((**x).cmp(&**y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::List(x), Value::List(y)) => {
            let pair = (x.id(), y.id());
            if visiting.contains(&pair) {
                return Err(cannot_compare_kind("cyclic lists"));
            }
            visiting.push(pair);
            let ordering = lark_stack::ensure_sufficient_stack(|| {
                compare_sequences(&x.to_vec(), &y.to_vec(), visiting)
            });
            visiting.pop();
            ordering
        }
        (Value::Tuple(x), Value::Tuple(y)) => compare_sequences(x, y, visiting),
        (Value::Struct(_), _) | (_, Value::Struct(_)) => Err(cannot_compare_kind("structs")),
        (Value::Depset(_), _) | (_, Value::Depset(_)) => Err(cannot_compare_kind("depsets")),
        _ => Err(cannot_compare(a.type_name(), b.type_name())),
    }
}

fn compare_sequences(
    a: &[Value],
    b: &[Value],
    visiting: &mut Vec<(ObjectId, ObjectId)>,
) -> Result<Ordering, EvalError> {
    for (x, y) in a.iter().zip(b) {
        if x != y {
            return compare_in(x, y, visiting);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/// Sort in place with [`compare`], reporting the first comparison failure.
pub fn sort_values(values: &mut [Value]) -> Result<(), EvalError> {
    let mut failure = None;
    values.sort_by(|a, b| match compare(a, b) {
        Ok(ordering) => ordering,
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
