//! Dict methods.

use super::dict_receiver;
use super::globals::pairs;
use crate::dispatch::{DefaultValue, Extras, Invocation, MethodDescriptor, ParamDescriptor, ParamType};
use crate::errors::{key_not_found, type_error, EvalAbort};
use crate::value::{HashKey, Value};

type Result<T = Value> = std::result::Result<T, EvalAbort>;

const KEY: ParamDescriptor = ParamDescriptor::positional("key", ParamType::Any);
const DEFAULT: ParamDescriptor =
    ParamDescriptor::positional("default", ParamType::Any).with_default(DefaultValue::None);

pub(super) static METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("clear", "clear", &[], clear),
    MethodDescriptor::new("get", "get", &[KEY, DEFAULT], get),
    MethodDescriptor::new("items", "items", &[], items),
    MethodDescriptor::new("keys", "keys", &[], keys),
    MethodDescriptor::new("pop", "pop", &[KEY], pop).with_varargs(),
    MethodDescriptor::new("setdefault", "setdefault", &[KEY, DEFAULT], setdefault),
    MethodDescriptor::new(
        "update",
        "update",
        &[ParamDescriptor::positional("args", ParamType::Iterable)
            .with_default(DefaultValue::EmptyTuple)],
        update,
    )
    .with_kwargs()
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("values", "values", &[], values),
];

fn clear(inv: &mut Invocation<'_>) -> Result {
    dict_receiver(inv)?.clear(&inv.mutability()?)?;
    Ok(Value::None)
}

fn get(inv: &mut Invocation<'_>) -> Result {
    let dict = dict_receiver(inv)?;
    match dict.get_value(inv.arg(0)?)? {
        Some(value) => Ok(value),
        None => Ok(inv.arg(1)?.clone()),
    }
}

fn items(inv: &mut Invocation<'_>) -> Result {
    let pairs = dict_receiver(inv)?
        .items()
        .into_iter()
        .map(|(k, v)| Value::tuple(vec![k, v]))
        .collect();
    Ok(Value::list(pairs, &inv.mutability()?))
}

fn keys(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::list(dict_receiver(inv)?.keys(), &inv.mutability()?))
}

fn values(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::list(dict_receiver(inv)?.values(), &inv.mutability()?))
}

/// `pop(key[, default])`: without a default a missing key is an error.
fn pop(inv: &mut Invocation<'_>) -> Result {
    let dict = dict_receiver(inv)?;
    let key = inv.arg(0)?;
    let fallback = match inv.varargs() {
        [] => None,
        [default] => Some(default.clone()),
        more => {
            return Err(type_error(format!(
                "pop() takes at most 2 arguments ({} given)",
                more.len().saturating_add(1)
            ))
            .into())
        }
    };
    let removed = dict.remove(&HashKey::new(key.clone())?, &inv.mutability()?)?;
    match (removed, fallback) {
        (Some(value), _) | (None, Some(value)) => Ok(value),
        (None, None) => Err(key_not_found(&key.repr()).into()),
    }
}

fn setdefault(inv: &mut Invocation<'_>) -> Result {
    let dict = dict_receiver(inv)?;
    let key = HashKey::new(inv.arg(0)?.clone())?;
    if let Some(value) = dict.get(&key) {
        return Ok(value);
    }
    let default = inv.arg(1)?.clone();
    dict.insert(key, default.clone(), &inv.mutability()?)?;
    Ok(default)
}

fn update(inv: &mut Invocation<'_>) -> Result {
    let dict = dict_receiver(inv)?;
    let active = inv.mutability()?;
    for (key, value) in pairs(inv, inv.arg(0)?)? {
        dict.insert(key, value, &active)?;
    }
    for (key, value) in inv.kwargs() {
        dict.insert(HashKey::new(key)?, value, &active)?;
    }
    Ok(Value::None)
}
