//! String methods.
//!
//! Positions (`find`, `start`, `end`) count characters, not bytes.

use super::{elements, str_receiver};
use crate::dispatch::{
    DefaultValue, Extras, FlagGate, Invocation, MethodDescriptor, ParamDescriptor, ParamType,
};
use crate::errors::{type_error, value_error, EvalAbort, EvalError};
use crate::semantics::flags;
use crate::value::Value;

type Result<T = Value> = std::result::Result<T, EvalAbort>;

const SUB: ParamDescriptor = ParamDescriptor::positional("sub", ParamType::String);
const START: ParamDescriptor =
    ParamDescriptor::positional("start", ParamType::Int).with_default(DefaultValue::Int(0));
const END: ParamDescriptor = ParamDescriptor::positional("end", ParamType::Int)
    .with_default(DefaultValue::None)
    .noneable();
const CHARS: ParamDescriptor = ParamDescriptor::positional("chars", ParamType::String)
    .with_default(DefaultValue::None)
    .noneable();
const PREFIX_GATE: FlagGate = FlagGate::experimental(flags::EXPERIMENTAL_STRING_PREFIX_METHODS);

pub(super) static METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("count", "count", &[SUB, START, END], count),
    MethodDescriptor::new(
        "endswith",
        "endswith",
        &[ParamDescriptor::positional("sub", ParamType::Any)],
        endswith,
    ),
    MethodDescriptor::new("find", "find", &[SUB, START, END], find),
    MethodDescriptor::new("format", "format", &[], format).with_varargs().with_kwargs(),
    MethodDescriptor::new(
        "join",
        "join",
        &[ParamDescriptor::positional("elements", ParamType::Iterable)],
        join,
    )
    .with_extras(Extras::SEMANTICS),
    MethodDescriptor::new("lower", "lower", &[], lower),
    MethodDescriptor::new("lstrip", "lstrip", &[CHARS], lstrip),
    MethodDescriptor::new(
        "removeprefix",
        "removeprefix",
        &[ParamDescriptor::positional("prefix", ParamType::String)],
        removeprefix,
    )
    .gated(PREFIX_GATE),
    MethodDescriptor::new(
        "removesuffix",
        "removesuffix",
        &[ParamDescriptor::positional("suffix", ParamType::String)],
        removesuffix,
    )
    .gated(PREFIX_GATE),
    MethodDescriptor::new(
        "replace",
        "replace",
        &[
            ParamDescriptor::positional("old", ParamType::String),
            ParamDescriptor::positional("new", ParamType::String),
            ParamDescriptor::positional("maxsplit", ParamType::Int)
                .with_default(DefaultValue::None)
                .noneable(),
        ],
        replace,
    ),
    MethodDescriptor::new("rstrip", "rstrip", &[CHARS], rstrip),
    MethodDescriptor::new(
        "split",
        "split",
        &[
            ParamDescriptor::either("sep", ParamType::String)
                .with_default(DefaultValue::None)
                .noneable(),
            ParamDescriptor::either("maxsplit", ParamType::Int)
                .with_default(DefaultValue::None)
                .noneable(),
        ],
        split,
    ),
    MethodDescriptor::new(
        "startswith",
        "startswith",
        &[ParamDescriptor::positional("sub", ParamType::Any)],
        startswith,
    ),
    MethodDescriptor::new("strip", "strip", &[CHARS], strip),
    MethodDescriptor::new("upper", "upper", &[], upper),
];

/// Byte range of the characters `start..end` of `s`, with Python-style
/// negative positions and clamping.
fn char_window(s: &str, start: i64, end: Option<i64>) -> (usize, usize) {
    let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
    let clamp = |pos: i64| {
        let pos = if pos < 0 { pos.saturating_add(len) } else { pos };
        usize::try_from(pos.clamp(0, len)).unwrap_or(0)
    };
    let (start, end) = (clamp(start), clamp(end.unwrap_or(len)));
    let byte = |chars: usize| s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i);
    if start >= end {
        (byte(start), byte(start))
    } else {
        (byte(start), byte(end))
    }
}

fn count(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    let (from, to) = char_window(s, inv.int(1)?, inv.opt_int(2)?);
    let window = &s[from..to];
    let sub = inv.string(0)?;
    let n = if sub.is_empty() {
        window.chars().count().saturating_add(1)
    } else {
        window.matches(sub).count()
    };
    Ok(Value::int(i64::try_from(n).unwrap_or(i64::MAX)))
}

fn find(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    let (from, to) = char_window(s, inv.int(1)?, inv.opt_int(2)?);
    let found = s[from..to]
        .find(inv.string(0)?)
        .map(|offset| s[..from.saturating_add(offset)].chars().count());
    Ok(Value::int(
        found.map_or(-1, |pos| i64::try_from(pos).unwrap_or(i64::MAX)),
    ))
}

/// The string or tuple of strings accepted by `startswith`/`endswith`.
fn affixes(inv: &Invocation<'_>) -> std::result::Result<Vec<String>, EvalError> {
    let invalid = || {
        type_error(format!(
            "expected value of type 'string or tuple of strings' for parameter 'sub', \
             for call to {}",
            inv.rendered()
        ))
    };
    match inv.arg(0)? {
        Value::Str(s) => Ok(vec![s.to_string()]),
        Value::Tuple(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn endswith(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    Ok(Value::Bool(affixes(inv)?.iter().any(|sub| s.ends_with(sub.as_str()))))
}

fn startswith(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    Ok(Value::Bool(affixes(inv)?.iter().any(|sub| s.starts_with(sub.as_str()))))
}

fn join(inv: &mut Invocation<'_>) -> Result {
    let sep = str_receiver(inv)?;
    let mut out = String::new();
    for (i, item) in elements(inv, inv.arg(0)?)?.iter().enumerate() {
        let Some(part) = item.as_str() else {
            return Err(type_error(format!(
                "expected string for sequence element {i}, got '{}'",
                item.type_name()
            ))
            .into());
        };
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(part);
    }
    Ok(Value::from_string(out))
}

fn lower(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::from_string(str_receiver(inv)?.to_lowercase()))
}

fn upper(inv: &mut Invocation<'_>) -> Result {
    Ok(Value::from_string(str_receiver(inv)?.to_uppercase()))
}

#[derive(Copy, Clone)]
enum Side {
    Left,
    Right,
    Both,
}

fn strip_with(inv: &Invocation<'_>, side: Side) -> Result {
    let s = str_receiver(inv)?;
    let chars: Option<Vec<char>> = inv.opt_string(0)?.map(|c| c.chars().collect());
    let strip = |c: char| match &chars {
        Some(set) => set.contains(&c),
        None => c.is_whitespace(),
    };
    let out = match side {
        Side::Left => s.trim_start_matches(strip),
        Side::Right => s.trim_end_matches(strip),
        Side::Both => s.trim_matches(strip),
    };
    Ok(Value::string(out))
}

fn lstrip(inv: &mut Invocation<'_>) -> Result {
    strip_with(inv, Side::Left)
}

fn rstrip(inv: &mut Invocation<'_>) -> Result {
    strip_with(inv, Side::Right)
}

fn strip(inv: &mut Invocation<'_>) -> Result {
    strip_with(inv, Side::Both)
}

fn removeprefix(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    Ok(Value::string(s.strip_prefix(inv.string(0)?).unwrap_or(s)))
}

fn removesuffix(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    Ok(Value::string(s.strip_suffix(inv.string(0)?).unwrap_or(s)))
}

fn replace(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    let (old, new) = (inv.string(0)?, inv.string(1)?);
    let out = match inv.opt_int(2)? {
        Some(limit) if limit >= 0 => s.replacen(old, new, usize::try_from(limit).unwrap_or(0)),
        _ => s.replace(old, new),
    };
    Ok(Value::from_string(out))
}

fn split(inv: &mut Invocation<'_>) -> Result {
    let s = str_receiver(inv)?;
    let limit = inv
        .opt_int(1)?
        .filter(|n| *n >= 0)
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX));
    let parts: Vec<Value> = match inv.opt_string(0)? {
        Some("") => return Err(value_error("Empty separator").into()),
        Some(sep) => match limit {
            Some(n) => s.splitn(n.saturating_add(1), sep).map(Value::string).collect(),
            None => s.split(sep).map(Value::string).collect(),
        },
        None => split_whitespace(s, limit),
    };
    Ok(Value::list(parts, &inv.mutability()?))
}

/// Split on runs of whitespace; after `limit` splits the remainder, with
/// leading whitespace removed, is the last element.
fn split_whitespace(s: &str, limit: Option<usize>) -> Vec<Value> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if limit.is_some_and(|n| parts.len() >= n) {
            parts.push(Value::string(rest));
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(Value::string(&rest[..end]));
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(Value::string(rest));
                break;
            }
        }
    }
    parts
}

/// `"{} {name} {0}".format(...)`.
fn format(inv: &mut Invocation<'_>) -> Result {
    let template = str_receiver(inv)?;
    let positional = inv.varargs();
    let named = inv.kwargs();

    let mut out = String::with_capacity(template.len());
    let mut auto_index = 0usize;
    let (mut used_auto, mut used_manual) = (false, false);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(value_error("Found '}' without matching '{'").into()),
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(value_error("Found '{' without matching '}'").into())
                        }
                        Some(c) => field.push(c),
                    }
                }
                let value = if field.is_empty() {
                    used_auto = true;
                    let index = auto_index;
                    auto_index = auto_index.saturating_add(1);
                    positional.get(index).cloned().ok_or_else(|| {
                        value_error(format!("No replacement found for index {index}"))
                    })?
                } else if let Ok(index) = field.parse::<usize>() {
                    used_manual = true;
                    positional.get(index).cloned().ok_or_else(|| {
                        value_error(format!("No replacement found for index {index}"))
                    })?
                } else {
                    named
                        .iter()
                        .find(|(key, _)| key.as_str() == Some(field.as_str()))
                        .map(|(_, value)| value.clone())
                        .ok_or_else(|| value_error(format!("Missing argument '{field}'")))?
                };
                if used_auto && used_manual {
                    return Err(value_error(
                        "Cannot mix manual and automatic numbering of positional fields",
                    )
                    .into());
                }
                out.push_str(&value.to_str());
            }
            c => out.push(c),
        }
    }
    Ok(Value::from_string(out))
}
