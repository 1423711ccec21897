//! Indexing and slicing.

use crate::errors::{
    index_out_of_range, invalid_index_type, key_not_found, not_indexable, slice_step_zero,
    unsupported_item_assignment, EvalError,
};
use crate::mutability::Mutability;
use crate::value::{HashKey, Value};

/// Resolve a possibly negative index against `len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index.saturating_add(len) } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

fn int_index(key: &Value) -> Result<i64, EvalError> {
    key.as_int().ok_or_else(|| invalid_index_type(key.type_name()))
}

/// `object[key]`.
pub(crate) fn index(object: &Value, key: &Value) -> Result<Value, EvalError> {
    match object {
        Value::List(list) => {
            let i = int_index(key)?;
            normalize_index(i, list.len())
                .and_then(|pos| list.get(pos))
                .ok_or_else(|| index_out_of_range(i, list.len()))
        }
        Value::Tuple(items) => {
            let i = int_index(key)?;
            normalize_index(i, items.len())
                .map(|pos| items[pos].clone())
                .ok_or_else(|| index_out_of_range(i, items.len()))
        }
        Value::Str(s) => {
            let i = int_index(key)?;
            let len = s.chars().count();
            normalize_index(i, len)
                .and_then(|pos| s.chars().nth(pos))
                .map(|c| Value::from_string(c.to_string()))
                .ok_or_else(|| index_out_of_range(i, len))
        }
        Value::Dict(dict) => dict
            .get_value(key)?
            .ok_or_else(|| key_not_found(&key.repr())),
        _ => Err(not_indexable(object.type_name(), key.type_name())),
    }
}

/// `object[key] = value`.
pub(crate) fn set_index(
    object: &Value,
    key: Value,
    value: Value,
    active: &Mutability,
) -> Result<(), EvalError> {
    match object {
        Value::List(list) => {
            let i = int_index(&key)?;
            let pos =
                normalize_index(i, list.len()).ok_or_else(|| index_out_of_range(i, list.len()))?;
            list.set(pos, value, active)
        }
        Value::Dict(dict) => dict.insert(HashKey::new(key)?, value, active),
        _ => Err(unsupported_item_assignment(object.type_name())),
    }
}

/// Positions selected by `[start:end:step]` over a sequence of `len`
/// elements. Out-of-range bounds clamp.
fn slice_indices(
    len: usize,
    start: &Value,
    end: &Value,
    step: &Value,
) -> Result<Vec<usize>, EvalError> {
    let step = match step {
        Value::None => 1,
        other => int_index(other)?,
    };
    if step == 0 {
        return Err(slice_step_zero());
    }
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let bound = |value: &Value, default: i64| -> Result<i64, EvalError> {
        let raw = match value {
            Value::None => return Ok(default),
            other => int_index(other)?,
        };
        let adjusted = if raw < 0 { raw.saturating_add(len) } else { raw };
        Ok(if step > 0 {
            adjusted.clamp(0, len)
        } else {
            adjusted.clamp(-1, len.saturating_sub(1))
        })
    };

    let mut indices = Vec::new();
    if step > 0 {
        let mut i = bound(start, 0)?;
        let stop = bound(end, len)?;
        while i < stop {
            indices.extend(usize::try_from(i).ok());
            i = i.saturating_add(step);
        }
    } else {
        let mut i = bound(start, len.saturating_sub(1))?;
        let stop = bound(end, -1)?;
        while i > stop {
            indices.extend(usize::try_from(i).ok());
            i = i.saturating_add(step);
        }
    }
    Ok(indices)
}

/// `object[start:end:step]` on a list, tuple or string.
pub(crate) fn slice(
    object: &Value,
    start: &Value,
    end: &Value,
    step: &Value,
    active: &Mutability,
) -> Result<Value, EvalError> {
    match object {
        Value::List(list) => {
            let items = list.to_vec();
            let picked = slice_indices(items.len(), start, end, step)?
                .into_iter()
                .map(|i| items[i].clone())
                .collect();
            Ok(Value::list(picked, active))
        }
        Value::Tuple(items) => {
            let picked = slice_indices(items.len(), start, end, step)?
                .into_iter()
                .map(|i| items[i].clone())
                .collect();
            Ok(Value::tuple(picked))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked: String = slice_indices(chars.len(), start, end, step)?
                .into_iter()
                .map(|i| chars[i])
                .collect();
            Ok(Value::from_string(picked))
        }
        _ => Err(not_indexable(object.type_name(), "slice")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ints(values: &[i64]) -> Value {
        Value::tuple(values.iter().copied().map(Value::int).collect())
    }

    fn sl(start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Value {
        let v = |x: Option<i64>| x.map_or(Value::None, Value::int);
        slice(
            &ints(&[0, 1, 2, 3, 4]),
            &v(start),
            &v(end),
            &v(step),
            &Mutability::new("test"),
        )
        .unwrap()
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(-4, 3), None);
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(index(&ints(&[1, 2, 3]), &Value::int(-1)).unwrap(), Value::int(3));
    }

    #[test]
    fn slices_clamp() {
        assert_eq!(sl(Some(1), Some(100), None), ints(&[1, 2, 3, 4]));
        assert_eq!(sl(Some(-2), None, None), ints(&[3, 4]));
        assert_eq!(sl(None, None, Some(-1)), ints(&[4, 3, 2, 1, 0]));
        assert_eq!(sl(None, None, Some(2)), ints(&[0, 2, 4]));
        assert_eq!(sl(Some(3), Some(0), Some(-2)), ints(&[3, 1]));
        assert_eq!(sl(Some(-100), Some(2), None), ints(&[0, 1]));
    }

    #[test]
    fn zero_step_fails() {
        let err = slice(
            &ints(&[1]),
            &Value::None,
            &Value::None,
            &Value::int(0),
            &Mutability::new("test"),
        )
        .unwrap_err();
        assert_eq!(err.message, "slice step cannot be zero");
    }

    #[test]
    fn string_slice() {
        let s = slice(
            &Value::string("hello"),
            &Value::int(1),
            &Value::int(-1),
            &Value::None,
            &Mutability::new("test"),
        )
        .unwrap();
        assert_eq!(s, Value::string("ell"));
    }
}
