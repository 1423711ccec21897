//! The built-in library: global functions and the methods of the built-in
//! types.
//!
//! Each submodule exposes a `static` slice of [`MethodDescriptor`]s;
//! [`register`] files them under their receiver type. Global functions are
//! the methods of [`TypeTag::Universe`].

mod depset;
mod dict;
mod globals;
mod list;
mod string;
mod structure;

use crate::dispatch::{Invocation, MethodRegistry};
use crate::errors::{internal, EvalError};
use crate::value::{DictValue, Heap, ListValue, TypeTag, Value};

/// Register the whole library.
pub fn register(registry: &mut MethodRegistry) {
    registry.register_all(TypeTag::Universe, globals::METHODS);
    registry.register_all(TypeTag::String, string::METHODS);
    registry.register_all(TypeTag::List, list::METHODS);
    registry.register_all(TypeTag::Dict, dict::METHODS);
    registry.register_all(TypeTag::Depset, depset::METHODS);
    registry.register_all(TypeTag::Struct, structure::METHODS);
}

#[cold]
fn wrong_receiver(inv: &Invocation<'_>, value: &Value) -> EvalError {
    internal(format!(
        "{} was invoked on a value of type '{}'",
        inv.rendered(),
        value.type_name()
    ))
}

fn str_receiver<'i>(inv: &'i Invocation<'_>) -> Result<&'i str, EvalError> {
    let receiver = inv.receiver()?;
    receiver
        .as_str()
        .ok_or_else(|| wrong_receiver(inv, receiver))
}

fn list_receiver(inv: &Invocation<'_>) -> Result<Heap<ListValue>, EvalError> {
    match inv.receiver()? {
        Value::List(list) => Ok(list.clone()),
        other => Err(wrong_receiver(inv, other)),
    }
}

fn dict_receiver(inv: &Invocation<'_>) -> Result<Heap<DictValue>, EvalError> {
    match inv.receiver()? {
        Value::Dict(dict) => Ok(dict.clone()),
        other => Err(wrong_receiver(inv, other)),
    }
}

/// The elements of an iterable argument, under the caller's semantics.
/// Methods using this must request [`Extras::SEMANTICS`](crate::dispatch::Extras).
fn elements(inv: &Invocation<'_>, value: &Value) -> Result<Vec<Value>, EvalError> {
    value.iterate(inv.semantics()?)
}
