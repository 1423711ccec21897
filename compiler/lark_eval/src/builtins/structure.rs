//! Struct methods.

use std::fmt::Write as _;

use crate::dispatch::{Invocation, MethodDescriptor};
use crate::errors::{internal, type_error, EvalAbort, EvalError};
use crate::value::Value;

pub(super) static METHODS: &[MethodDescriptor] = &[MethodDescriptor::new(
    "to_json",
    "to_json",
    &[],
    to_json,
)];

fn to_json(inv: &mut Invocation<'_>) -> Result<Value, EvalAbort> {
    let receiver = inv.receiver()?;
    if !matches!(receiver, Value::Struct(_)) {
        return Err(internal("struct method invoked on a non-struct").into());
    }
    let mut out = String::new();
    write_json(receiver, &mut out)?;
    Ok(Value::from_string(out))
}

fn write_json(value: &Value, out: &mut String) -> Result<(), EvalError> {
    match value {
        Value::None => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Str(s) => write_json_string(s, out),
        Value::List(list) => write_json_array(&list.to_vec(), out)?,
        Value::Tuple(items) => write_json_array(items, out)?,
        Value::Dict(dict) => {
            out.push('{');
            for (i, (key, field)) in dict.items().iter().enumerate() {
                let Some(key) = key.as_str() else {
                    return Err(type_error(format!(
                        "Keys must be a string but got a {} for to_json",
                        key.type_name()
                    )));
                };
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out);
                out.push(':');
                write_json(field, out)?;
            }
            out.push('}');
        }
        Value::Struct(s) => {
            out.push('{');
            for (i, (name, field)) in s.fields().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(name, out);
                out.push(':');
                write_json(field, out)?;
            }
            out.push('}');
        }
        Value::Function(_) | Value::Builtin(_) | Value::Depset(_) => {
            return Err(type_error(format!(
                "Invalid text format, expected a struct, a string, a bool, or an int but got a \
                 {} for to_json",
                value.type_name()
            )))
        }
    }
    Ok(())
}

fn write_json_array(items: &[Value], out: &mut String) -> Result<(), EvalError> {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_json(item, out)?;
    }
    out.push(']');
    Ok(())
}

fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
