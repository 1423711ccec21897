//! Global functions.

use std::cmp::Ordering;

use lark_ir::Name;

use super::elements;
use crate::depset::{Depset, Order};
use crate::dispatch::{
    DefaultValue, Extras, FlagGate, Invocation, MethodDescriptor, ParamDescriptor, ParamType,
};
use crate::errors::{
    argument_type, fail as fail_error, sequence_too_long, type_error, value_error, EvalAbort,
    EvalError,
};
use crate::interpreter::{attribute_names, call_value, get_attribute, has_attribute};
use crate::semantics::flags;
use crate::value::{compare, sort_values, DictEntries, HashKey, Value, MAX_SEQUENCE_LENGTH};

type Result<T = Value> = std::result::Result<T, EvalAbort>;

const X: ParamDescriptor = ParamDescriptor::positional("x", ParamType::Any);
const ITERABLE: ParamDescriptor = ParamDescriptor::positional("x", ParamType::Iterable);

pub(super) static METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("all", "all", &[ITERABLE], all).with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("any", "any", &[ITERABLE], any).with_extras(Extras::SEMANTICS),
    MethodDescriptor::new(
        "bool",
        "bool",
        &[X.with_default(DefaultValue::Bool(false))],
        bool_,
    ),
    MethodDescriptor::new(
        "depset",
        "depset",
        &[
            ParamDescriptor::positional("x", ParamType::Any).with_default(DefaultValue::None),
            ParamDescriptor::either("order", ParamType::String)
                .with_default(DefaultValue::Str("default")),
            ParamDescriptor::named("direct", ParamType::Sequence)
                .with_default(DefaultValue::None)
                .noneable(),
            ParamDescriptor::named("transitive", ParamType::Sequence)
                .with_default(DefaultValue::None)
                .noneable(),
            ParamDescriptor::named("items", ParamType::Sequence)
                .with_default(DefaultValue::EmptyList)
                .gated(
                    FlagGate::deprecated(flags::INCOMPATIBLE_DISABLE_DEPSET_ITEMS),
                    DefaultValue::EmptyList,
                ),
        ],
        depset,
    )
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new(
        "dict",
        "dict",
        &[ParamDescriptor::positional("args", ParamType::Iterable)
            .with_default(DefaultValue::EmptyTuple)],
        dict,
    )
    .with_kwargs()
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("dir", "dir", &[X], dir).with_extras(Extras::THREAD),
    MethodDescriptor::new("enumerate", "enumerate", &[ITERABLE], enumerate)
        .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new(
        "fail",
        "fail",
        &[
            X.with_default(DefaultValue::None),
            ParamDescriptor::named("attr", ParamType::String)
                .with_default(DefaultValue::None)
                .noneable(),
        ],
        fail,
    ),
    MethodDescriptor::new(
        "getattr",
        "getattr",
        &[X, ParamDescriptor::positional("name", ParamType::String)],
        getattr,
    )
    .with_varargs()
    .with_extras(Extras::THREAD),
    MethodDescriptor::new(
        "hasattr",
        "hasattr",
        &[X, ParamDescriptor::positional("name", ParamType::String)],
        hasattr,
    )
    .with_extras(Extras::THREAD),
    MethodDescriptor::new("int", "int", &[X], int),
    MethodDescriptor::new("len", "len", &[X], len),
    MethodDescriptor::new(
        "list",
        "list",
        &[ITERABLE.with_default(DefaultValue::EmptyTuple)],
        list,
    )
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("max", "max", &[], max)
        .with_varargs()
        .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("min", "min", &[], min)
        .with_varargs()
        .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new(
        "print",
        "print",
        &[ParamDescriptor::named("sep", ParamType::String).with_default(DefaultValue::Str(" "))],
        print,
    )
    .with_varargs()
    .with_extras(Extras::LOCATION.union(Extras::THREAD)),
    MethodDescriptor::new(
        "range",
        "range",
        &[
            ParamDescriptor::positional("start_or_stop", ParamType::Int),
            ParamDescriptor::positional("stop_or_none", ParamType::Int)
                .with_default(DefaultValue::None)
                .noneable(),
            ParamDescriptor::positional("step", ParamType::Int).with_default(DefaultValue::Int(1)),
        ],
        range,
    ),
    MethodDescriptor::new("repr", "repr", &[X], repr),
    MethodDescriptor::new(
        "reversed",
        "reversed",
        &[ParamDescriptor::positional("sequence", ParamType::Sequence)],
        reversed,
    ),
    MethodDescriptor::new(
        "sorted",
        "sorted",
        &[
            ITERABLE,
            ParamDescriptor::named("key", ParamType::Callable)
                .with_default(DefaultValue::None)
                .noneable(),
            ParamDescriptor::named("reverse", ParamType::Bool)
                .with_default(DefaultValue::Bool(false)),
        ],
        sorted,
    )
    .with_extras(Extras::LOCATION.union(Extras::THREAD).union(Extras::SEMANTICS)),
    MethodDescriptor::new("str", "str", &[X], str_),
    MethodDescriptor::new("struct", "struct_", &[], structure).with_kwargs(),
    MethodDescriptor::new(
        "tuple",
        "tuple",
        &[ITERABLE.with_default(DefaultValue::EmptyTuple)],
        tuple,
    )
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("type", "type_", &[X], type_),
    MethodDescriptor::new("zip", "zip", &[], zip)
        .with_varargs()
        .with_extras(Extras::SEMANTICS),
];

fn all(inv: &mut Invocation<'_>) -> Result {
    let items = elements(inv, inv.arg(0)?)?;
    Ok(Value::Bool(items.iter().all(Value::truth)))
}

fn any(inv: &mut Invocation<'_>) -> Result {
    let items = elements(inv, inv.arg(0)?)?;
    Ok(Value::Bool(items.iter().any(Value::truth)))
}

fn bool_(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::Bool(inv.arg(0)?.truth()))
}

/// `depset(x, order, direct=, transitive=, items=)`.
///
/// The first positional argument is `items` until
/// `incompatible_disable_depset_items` is set, and `direct` afterwards.
fn depset(inv: &mut Invocation<'_>) -> Result {
    let order = Order::parse(inv.string(1)?)?;
    let first = inv.arg(0)?.clone();
    let mut direct = inv.arg(2)?.clone();
    let transitive = inv.arg(3)?.clone();
    let legacy_items = !inv
        .semantics()?
        .flag(flags::INCOMPATIBLE_DISABLE_DEPSET_ITEMS);

    if legacy_items {
        if !matches!(
            first,
            Value::None | Value::List(_) | Value::Tuple(_) | Value::Depset(_)
        ) {
            return Err(argument_type(ParamType::Sequence.name(), "x", &inv.rendered()).into());
        }
        let items = if first.is_none() { inv.arg(4)?.clone() } else { first };
        let has_items = items.length()?.is_some_and(|n| n > 0);
        if has_items {
            if !direct.is_none() {
                return Err(value_error(
                    "Do not pass both 'direct' and 'items' argument to depset constructor.",
                )
                .into());
            }
            direct = items;
        }
    } else if !first.is_none() {
        if !direct.is_none() {
            return Err(type_error(
                "parameter 'direct' cannot be specified both positionally and by keyword",
            )
            .into());
        }
        direct = first;
    }

    let mut builder = Depset::builder(order);
    if !direct.is_none() {
        for item in elements(inv, &direct)? {
            builder.add_direct(item)?;
        }
    }
    if !transitive.is_none() {
        for child in elements(inv, &transitive)? {
            match child {
                Value::Depset(set) => {
                    builder.add_transitive(set)?;
                }
                other => {
                    return Err(type_error(format!(
                        "expected type 'depset' for 'transitive' element but got type '{}' \
                         instead",
                        other.type_name()
                    ))
                    .into())
                }
            }
        }
    }
    Ok(Value::depset(builder.build()))
}

/// Entries from a dict or from a sequence of key/value pairs.
pub(super) fn pairs(inv: &Invocation<'_>, source: &Value) -> std::result::Result<DictEntries, EvalError> {
    if let Value::Dict(dict) = source {
        return Ok(dict.to_entries());
    }
    let mut entries = DictEntries::default();
    for (i, item) in elements(inv, source)?.into_iter().enumerate() {
        let pair = match &item {
            Value::List(list) => list.to_vec(),
            Value::Tuple(items) => items.to_vec(),
            other => {
                return Err(type_error(format!(
                    "cannot convert item #{i} of type '{}' to a key/value pair",
                    other.type_name()
                )))
            }
        };
        let [key, value]: [Value; 2] = pair.try_into().map_err(|rest: Vec<Value>| {
            value_error(format!(
                "item #{i} has length {}, but exactly two elements are required",
                rest.len()
            ))
        })?;
        entries.insert(HashKey::new(key)?, value);
    }
    Ok(entries)
}

fn dict(inv: &mut Invocation<'_>) -> Result {
    let mut entries = pairs(inv, inv.arg(0)?)?;
    for (key, value) in inv.kwargs() {
        entries.insert(HashKey::new(key)?, value);
    }
    Ok(Value::dict(entries, &inv.mutability()?))
}

fn dir(inv: &mut Invocation<'_>) -> Result {
    let object = inv.arg(0)?.clone();
    let mutability = inv.mutability()?;
    let names = attribute_names(inv.thread()?, &object)?;
    Ok(Value::list(
        names.into_iter().map(Value::from_string).collect(),
        &mutability,
    ))
}

fn enumerate(inv: &mut Invocation<'_>) -> Result {
    let items = elements(inv, inv.arg(0)?)?;
    let pairs = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let index = i64::try_from(i).unwrap_or(i64::MAX);
            Value::tuple(vec![Value::int(index), item])
        })
        .collect();
    Ok(Value::list(pairs, &inv.mutability()?))
}

fn fail(inv: &mut Invocation<'_>) -> Result {
    let message = match inv.arg(0)? {
        Value::None => "failed".to_string(),
        other => other.to_str(),
    };
    let message = match inv.opt_string(1)? {
        Some(attr) => format!("attribute {attr}: {message}"),
        None => message,
    };
    Err(fail_error(message).into())
}

fn getattr(inv: &mut Invocation<'_>) -> Result {
    let object = inv.arg(0)?.clone();
    let name = inv.string(1)?.to_string();
    let fallback = match inv.varargs() {
        [] => None,
        [default] => Some(default.clone()),
        more => {
            return Err(type_error(format!(
                "getattr() takes at most 3 arguments ({} given)",
                more.len().saturating_add(2)
            ))
            .into())
        }
    };
    match (get_attribute(inv.thread()?, &object, &name), fallback) {
        (Err(EvalAbort::Error(_)), Some(default)) => Ok(default),
        (result, _) => result,
    }
}

fn hasattr(inv: &mut Invocation<'_>) -> Result {
    let object = inv.arg(0)?.clone();
    let name = inv.string(1)?.to_string();
    let found = has_attribute(inv.thread()?, &object, &name)?;
    Ok(Value::Bool(found))
}

fn int(inv: &mut Invocation<'_>) -> Result {
    match inv.arg(0)? {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::int(i64::from(*b))),
        Value::Str(s) => parse_int(s).map(Value::int).ok_or_else(|| {
            value_error(format!(
                "invalid literal for int() with base 10: {}",
                Value::string(s).repr()
            ))
            .into()
        }),
        other => Err(type_error(format!(
            "argument must be a string, a bool or an int, not '{}'",
            other.type_name()
        ))
        .into()),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn len(inv: &mut Invocation<'_>) -> Result {
    let value = inv.arg(0)?;
    match value.length()? {
        Some(n) => Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX))),
        None => Err(type_error(format!("object of type '{}' has no len()", value.type_name())).into()),
    }
}

fn list(inv: &mut Invocation<'_>) -> Result {
    let items = elements(inv, inv.arg(0)?)?;
    Ok(Value::list(items, &inv.mutability()?))
}

/// The arguments of `min`/`max`: a single iterable, or the values
/// themselves.
fn candidates(inv: &Invocation<'_>, name: &str) -> std::result::Result<Vec<Value>, EvalError> {
    let items = match inv.varargs() {
        [single] => elements(inv, single)?,
        many => many.to_vec(),
    };
    if items.is_empty() {
        return Err(value_error(format!("{name}() expected at least one item")));
    }
    Ok(items)
}

fn extreme(items: Vec<Value>, keep: Ordering) -> std::result::Result<Value, EvalError> {
    let mut best: Option<Value> = None;
    for item in items {
        let replace = match &best {
            None => true,
            Some(current) => compare(&item, current)? == keep,
        };
        if replace {
            best = Some(item);
        }
    }
    Ok(best.unwrap_or(Value::None))
}

fn max(inv: &mut Invocation<'_>) -> Result {
    Ok(extreme(candidates(inv, "max")?, Ordering::Greater)?)
}

fn min(inv: &mut Invocation<'_>) -> Result {
    Ok(extreme(candidates(inv, "min")?, Ordering::Less)?)
}

fn print(inv: &mut Invocation<'_>) -> Result {
    let sep = inv.string(0)?.to_string();
    let message = inv
        .varargs()
        .iter()
        .map(Value::to_str)
        .collect::<Vec<_>>()
        .join(&sep);
    let location = inv.location()?.clone();
    inv.thread()?.print_handler().print(&location, &message);
    Ok(Value::None)
}

fn range(inv: &mut Invocation<'_>) -> Result {
    let (start, stop) = match inv.opt_int(1)? {
        Some(stop) => (inv.int(0)?, stop),
        None => (0, inv.int(0)?),
    };
    let step = inv.int(2)?;
    if step == 0 {
        return Err(value_error("step cannot be 0").into());
    }
    let len = range_len(start, stop, step);
    let len = match usize::try_from(len) {
        Ok(len) if len <= MAX_SEQUENCE_LENGTH => len,
        _ => return Err(sequence_too_long(len).into()),
    };
    let items = std::iter::successors(Some(start), |i| i.checked_add(step))
        .take(len)
        .map(Value::int)
        .collect();
    Ok(Value::list(items, &inv.mutability()?))
}

/// Number of values `range(start, stop, step)` yields; `step` is non-zero.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "operands are widened from i64, so i128 cannot overflow"
)]
fn range_len(start: i64, stop: i64, step: i64) -> u128 {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let span = if step > 0 { stop - start } else { start - stop };
    if span <= 0 {
        return 0;
    }
    let step = step.abs();
    ((span + step - 1) / step).unsigned_abs()
}

fn repr(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::from_string(inv.arg(0)?.repr()))
}

fn reversed(inv: &mut Invocation<'_>) -> Result {
    let mut items = match inv.arg(0)? {
        Value::List(list) => list.to_vec(),
        Value::Tuple(items) => items.to_vec(),
        other => return Err(type_error(format!("cannot reverse '{}'", other.type_name())).into()),
    };
    items.reverse();
    Ok(Value::list(items, &inv.mutability()?))
}

fn sorted(inv: &mut Invocation<'_>) -> Result {
    let mut items = elements(inv, inv.arg(0)?)?;
    let key = inv.arg(1)?.clone();
    let reverse = inv.arg(2)?.truth();
    let mutability = inv.mutability()?;

    if key.is_none() {
        sort_values(&mut items)?;
        if reverse {
            items.reverse();
        }
        return Ok(Value::list(items, &mutability));
    }

    let location = inv.location()?.clone();
    let thread = inv.thread()?;
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let k = call_value(thread, &key, vec![item.clone()], Vec::new(), &location, None)?;
        keyed.push((k, item));
    }
    let mut failure = None;
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = if reverse { compare(b, a) } else { compare(a, b) };
        ordering.unwrap_or_else(|err| {
            failure.get_or_insert(err);
            Ordering::Equal
        })
    });
    if let Some(err) = failure {
        return Err(err.into());
    }
    Ok(Value::list(
        keyed.into_iter().map(|(_, item)| item).collect(),
        &mutability,
    ))
}

fn str_(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::from_string(inv.arg(0)?.to_str()))
}

fn structure(inv: &mut Invocation<'_>) -> Result {
    let mut fields = Vec::new();
    for (key, value) in inv.kwargs() {
        if let Some(name) = key.as_str() {
            fields.push((Name::from(name), value));
        }
    }
    Ok(Value::structure(fields))
}

fn tuple(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::tuple(elements(inv, inv.arg(0)?)?))
}

fn type_(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::string(inv.arg(0)?.type_name()))
}

fn zip(inv: &mut Invocation<'_>) -> Result {
    let mut columns = Vec::new();
    for arg in inv.varargs() {
        columns.push(elements(inv, arg)?.into_iter());
    }
    let mut rows = Vec::new();
    if !columns.is_empty() {
        'rows: loop {
            let mut row = Vec::with_capacity(columns.len());
            for column in &mut columns {
                match column.next() {
                    Some(value) => row.push(value),
                    None => break 'rows,
                }
            }
            rows.push(Value::tuple(row));
        }
    }
    Ok(Value::list(rows, &inv.mutability()?))
}
