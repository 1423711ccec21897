//! List methods.

use super::{elements, list_receiver};
use crate::dispatch::{DefaultValue, Extras, Invocation, MethodDescriptor, ParamDescriptor, ParamType};
use crate::errors::{index_out_of_range, value_error, EvalAbort};
use crate::interpreter::normalize_index;
use crate::value::Value;

type Result<T = Value> = std::result::Result<T, EvalAbort>;

const ITEM: ParamDescriptor = ParamDescriptor::positional("x", ParamType::Any);

pub(super) static METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("append", "append", &[ITEM], append),
    MethodDescriptor::new("clear", "clear", &[], clear),
    MethodDescriptor::new(
        "extend",
        "extend",
        &[ParamDescriptor::positional("items", ParamType::Iterable)],
        extend,
    )
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("index", "index", &[ITEM], index),
    MethodDescriptor::new(
        "insert",
        "insert",
        &[ParamDescriptor::positional("index", ParamType::Int), ITEM],
        insert,
    ),
    MethodDescriptor::new(
        "pop",
        "pop",
        &[ParamDescriptor::positional("i", ParamType::Int).with_default(DefaultValue::Int(-1))],
        pop,
    ),
    MethodDescriptor::new("remove", "remove", &[ITEM], remove),
];

fn append(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    list.push(inv.arg(0)?.clone(), &inv.mutability()?)?;
    Ok(Value::None)
}

fn clear(inv: &mut Invocation<'_>) -> Result {
    list_receiver(inv)?.clear(&inv.mutability()?)?;
    Ok(Value::None)
}

fn extend(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    let items = elements(inv, inv.arg(0)?)?;
    list.extend(items, &inv.mutability()?)?;
    Ok(Value::None)
}

fn position(list: &[Value], item: &Value) -> Option<usize> {
    list.iter().position(|x| x == item)
}

fn index(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    let item = inv.arg(0)?;
    match list.with_items(|items| position(items, item)) {
        Some(i) => Ok(Value::int(i64::try_from(i).unwrap_or(i64::MAX))),
        None => Err(value_error(format!("item {} not found in list", item.repr())).into()),
    }
}

fn insert(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
    let index = inv.int(0)?;
    let index = if index < 0 { index.saturating_add(len).max(0) } else { index };
    list.insert(
        usize::try_from(index).unwrap_or(usize::MAX),
        inv.arg(1)?.clone(),
        &inv.mutability()?,
    )?;
    Ok(Value::None)
}

fn pop(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    let requested = inv.int(0)?;
    let len = list.len();
    let index = normalize_index(requested, len).ok_or_else(|| index_out_of_range(requested, len))?;
    Ok(list.remove_at(index, &inv.mutability()?)?)
}

fn remove(inv: &mut Invocation<'_>) -> Result {
    let list = list_receiver(inv)?;
    let item = inv.arg(0)?;
    match list.with_items(|items| position(items, item)) {
        Some(i) => {
            list.remove_at(i, &inv.mutability()?)?;
            Ok(Value::None)
        }
        None => Err(value_error(format!("item {} not found in list", item.repr())).into()),
    }
}
