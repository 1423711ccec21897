//! Binary and unary operators.

use std::cmp::Ordering;

use lark_ir::{BinaryOp, UnaryOp};

use super::Thread;
use crate::depset;
use crate::errors::{
    depset_union_disabled, division_by_zero, format_error, in_requires_string, integer_overflow,
    modulo_by_zero, negative_shift, sequence_too_long, slash_disabled, unsupported_binary,
    unsupported_unary, EvalError,
};
use crate::semantics::flags;
use crate::value::{compare, HashKey, Heap, ScalarInt, Value, MAX_SEQUENCE_LENGTH};

/// Apply a binary operator. `and`/`or` are short-circuited by the evaluator
/// and only reach here from host code.
pub(crate) fn binary_op(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    thread: &Thread,
) -> Result<Value, EvalError> {
    let unsupported = || unsupported_binary(op, left.type_name(), right.type_name());
    match op {
        BinaryOp::And => Ok(if left.truth() { right } else { left }.clone()),
        BinaryOp::Or => Ok(if left.truth() { left } else { right }.clone()),
        BinaryOp::Equals => Ok(Value::Bool(left == right)),
        BinaryOp::NotEquals => Ok(Value::Bool(left != right)),
        BinaryOp::Less => Ok(Value::Bool(compare(left, right)? == Ordering::Less)),
        BinaryOp::LessEquals => Ok(Value::Bool(compare(left, right)? != Ordering::Greater)),
        BinaryOp::Greater => Ok(Value::Bool(compare(left, right)? == Ordering::Greater)),
        BinaryOp::GreaterEquals => Ok(Value::Bool(compare(left, right)? != Ordering::Less)),
        BinaryOp::In => Ok(Value::Bool(contains(right, left)?)),
        BinaryOp::NotIn => Ok(Value::Bool(!contains(right, left)?)),
        BinaryOp::Plus => plus(left, right, thread).and_then(|v| v.ok_or_else(unsupported)),
        BinaryOp::Pipe => match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(*a | *b)),
            (Value::Depset(set), _) => depset_union(set, right, thread, "`|` operator"),
            _ => Err(unsupported()),
        },
        BinaryOp::Multiply => multiply(left, right, thread).and_then(|v| v.ok_or_else(unsupported)),
        BinaryOp::Percent => match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                if b.is_zero() {
                    return Err(modulo_by_zero());
                }
                a.checked_floor_mod(*b)
                    .map(Value::Int)
                    .ok_or_else(integer_overflow)
            }
            (Value::Str(format), _) => format_string(format, right).map(Value::from_string),
            _ => Err(unsupported()),
        },
        _ => {
            let (Value::Int(a), Value::Int(b)) = (left, right) else {
                return Err(unsupported());
            };
            int_op(op, *a, *b, thread).map(Value::Int)
        }
    }
}

/// Integer-only operators.
fn int_op(op: BinaryOp, a: ScalarInt, b: ScalarInt, thread: &Thread) -> Result<ScalarInt, EvalError> {
    match op {
        BinaryOp::Minus => a.checked_sub(b).ok_or_else(integer_overflow),
        BinaryOp::Divide | BinaryOp::FloorDivide => {
            if op == BinaryOp::Divide
                && thread
                    .semantics()
                    .flag(flags::INCOMPATIBLE_DISALLOW_SLASH_OPERATOR)
            {
                return Err(slash_disabled());
            }
            if b.is_zero() {
                return Err(division_by_zero());
            }
            a.checked_floor_div(b).ok_or_else(integer_overflow)
        }
        BinaryOp::Ampersand => Ok(a & b),
        BinaryOp::Caret => Ok(a ^ b),
        BinaryOp::ShiftLeft => {
            if b.raw() < 0 {
                return Err(negative_shift(b.raw()));
            }
            a.checked_shl(b.raw()).ok_or_else(integer_overflow)
        }
        BinaryOp::ShiftRight => {
            if b.raw() < 0 {
                return Err(negative_shift(b.raw()));
            }
            a.checked_shr(b.raw()).ok_or_else(integer_overflow)
        }
        _ => Err(unsupported_binary(op, "int", "int")),
    }
}

fn plus(left: &Value, right: &Value, thread: &Thread) -> Result<Option<Value>, EvalError> {
    Ok(Some(match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            Value::Int(a.checked_add(*b).ok_or_else(integer_overflow)?)
        }
        (Value::Str(a), Value::Str(b)) => {
            let mut joined = String::with_capacity(a.len().saturating_add(b.len()));
            joined.push_str(a);
            joined.push_str(b);
            Value::from_string(joined)
        }
        (Value::List(a), Value::List(b)) => {
            let mut items = a.to_vec();
            items.extend(b.to_vec());
            Value::list(items, thread.mutability())
        }
        (Value::Tuple(a), Value::Tuple(b)) => {
            Value::tuple(a.iter().chain(b.iter()).cloned().collect())
        }
        (Value::Depset(set), _) => return depset_union(set, right, thread, "`+` operator").map(Some),
        _ => return Ok(None),
    }))
}

fn multiply(left: &Value, right: &Value, thread: &Thread) -> Result<Option<Value>, EvalError> {
    let (sequence, count) = match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            return a
                .checked_mul(*b)
                .map(|n| Some(Value::Int(n)))
                .ok_or_else(integer_overflow);
        }
        (Value::Int(n), other) | (other, Value::Int(n)) => (other, n.raw()),
        _ => return Ok(None),
    };
    let times = usize::try_from(count).unwrap_or(0);
    Ok(Some(match sequence {
        Value::Str(s) => {
            repeated_len(s.len(), times)?;
            Value::from_string(s.repeat(times))
        }
        Value::List(list) => Value::list(repeat(&list.to_vec(), times)?, thread.mutability()),
        Value::Tuple(items) => Value::tuple(repeat(items, times)?),
        _ => return Ok(None),
    }))
}

/// Length of `times` copies of a sequence of `len`, bounded by
/// [`MAX_SEQUENCE_LENGTH`].
fn repeated_len(len: usize, times: usize) -> Result<usize, EvalError> {
    let total = (len as u128).saturating_mul(times as u128);
    match usize::try_from(total) {
        Ok(total) if total <= MAX_SEQUENCE_LENGTH => Ok(total),
        _ => Err(sequence_too_long(total)),
    }
}

fn repeat(items: &[Value], times: usize) -> Result<Vec<Value>, EvalError> {
    let len = repeated_len(items.len(), times)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(out)
}

fn depset_union(
    set: &Heap<depset::Depset>,
    right: &Value,
    thread: &Thread,
    what: &str,
) -> Result<Value, EvalError> {
    if thread.semantics().flag(flags::INCOMPATIBLE_DEPSET_UNION) {
        return Err(depset_union_disabled(what));
    }
    Ok(Value::depset(depset::union(set, right)?))
}

pub(crate) fn unary_op(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truth())),
        (UnaryOp::Minus, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(integer_overflow),
        (UnaryOp::Plus, Value::Int(n)) => Ok(Value::Int(*n)),
        (UnaryOp::Tilde, Value::Int(n)) => Ok(Value::Int(!*n)),
        _ => Err(unsupported_unary(op, operand.type_name())),
    }
}

/// `item in container`.
pub(crate) fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match container {
        Value::List(list) => Ok(list.with_items(|items| items.contains(item))),
        Value::Tuple(items) => Ok(items.contains(item)),
        Value::Dict(dict) => Ok(dict.contains(&HashKey::new(item.clone())?)),
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(&**needle)),
            other => Err(in_requires_string(other.type_name())),
        },
        Value::Depset(set) => Ok(set.to_list()?.contains(item)),
        _ => Err(unsupported_binary(
            BinaryOp::In,
            item.type_name(),
            container.type_name(),
        )),
    }
}

/// `format % args` with `%s`, `%r`, `%d` and `%%`. A tuple supplies one
/// value per conversion; anything else is a single value.
fn format_string(format: &str, args: &Value) -> Result<String, EvalError> {
    let values: Vec<Value> = match args {
        Value::Tuple(items) => items.to_vec(),
        other => vec![other.clone()],
    };
    let mut values = values.into_iter();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(directive) = chars.next() else {
            return Err(format_error("incomplete format"));
        };
        if directive == '%' {
            out.push('%');
            continue;
        }
        let value = values
            .next()
            .ok_or_else(|| format_error("not enough arguments for format string"))?;
        match directive {
            's' => out.push_str(&value.to_str()),
            'r' => out.push_str(&value.repr()),
            'd' => match &value {
                Value::Int(n) => out.push_str(&n.to_string()),
                other => {
                    return Err(format_error(format!(
                        "invalid argument {} for format pattern %d",
                        other.repr()
                    )))
                }
            },
            other => {
                return Err(format_error(format!(
                    "unsupported format character '{other}'"
                )))
            }
        }
    }
    if values.next().is_some() {
        return Err(format_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}
