//! String conversion: `repr(x)` and `str(x)`.

use std::fmt::Write as _;

use super::Value;
use crate::depset::Order;
use crate::mutability::ObjectId;

impl Value {
    /// The source-like rendering used by `repr()` and in error messages.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        write_repr(self, &mut out, &mut Vec::new());
        out
    }

    /// Like [`Value::repr`], except that strings render without quotes.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            _ => self.repr(),
        }
    }
}

/// Appends `value` to `out`. `visiting` holds the containers currently being
/// rendered; meeting one again renders as `[...]` or `{...}`.
fn write_repr(value: &Value, out: &mut String, visiting: &mut Vec<ObjectId>) {
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Str(s) => write_quoted(s, out),
        Value::List(list) => {
            if visiting.contains(&list.id()) {
                out.push_str("[...]");
                return;
            }
            visiting.push(list.id());
            out.push('[');
            list.with_items(|items| write_items(items, out, visiting));
            out.push(']');
            visiting.pop();
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(items, out, visiting);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Dict(dict) => {
            if visiting.contains(&dict.id()) {
                out.push_str("{...}");
                return;
            }
            visiting.push(dict.id());
            out.push('{');
            dict.with_entries(|entries| {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_repr(k.value(), out, visiting);
                    out.push_str(": ");
                    write_repr(v, out, visiting);
                }
            });
            out.push('}');
            visiting.pop();
        }
        Value::Function(f) => {
            let _ = write!(out, "<function {}>", f.name());
        }
        Value::Builtin(b) => match b.receiver() {
            Some(receiver) => {
                let _ = write!(
                    out,
                    "<built-in method {} of {} value>",
                    b.name(),
                    receiver.type_name()
                );
            }
            None => {
                let _ = write!(out, "<built-in function {}>", b.name());
            }
        },
        Value::Depset(set) => {
            out.push_str("depset(");
            match set.to_list() {
                Ok(items) => {
                    out.push('[');
                    write_items(&items, out, visiting);
                    out.push(']');
                }
                Err(_) => out.push_str("..."),
            }
            if set.order() != Order::Stable {
                let _ = write!(out, ", order = \"{}\"", set.order().name());
            }
            out.push(')');
        }
        Value::Struct(s) => {
            out.push_str("struct(");
            for (i, (name, field)) in s.fields().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{name} = ");
                write_repr(field, out, visiting);
            }
            out.push(')');
        }
    }
}

fn write_items(items: &[Value], out: &mut String, visiting: &mut Vec<ObjectId>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out, visiting);
    }
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
}
