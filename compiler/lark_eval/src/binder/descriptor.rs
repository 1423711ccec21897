use lark_ir::Name;
use smallvec::SmallVec;

use super::NamedArgs;
use crate::dispatch::{GatePolarity, MethodDescriptor, ParamDescriptor, ParamType};
use crate::errors::{
    argument_type, deprecated_parameter, experimental_parameter, multiple_values, no_default,
    none_not_allowed, not_named, too_many_for_descriptor, unexpected_keywords, EvalError,
};
use crate::mutability::Mutability;
use crate::semantics::Semantics;
use crate::value::{DictEntries, HashKey, TypeTag, Value};

/// Bind arguments to the parameters of a host method.
///
/// Returns one value per declared parameter, followed by the `*args` tuple
/// and the `**kwargs` dict when the descriptor accepts them. Parameters
/// disabled under `semantics` are bound to their fallback value without
/// consuming any argument. Interpreter-supplied extras are not part of the
/// result; the caller attaches them to the invocation.
pub fn bind_descriptor(
    descriptor: &MethodDescriptor,
    receiver_type: TypeTag,
    positional: Vec<Value>,
    named: NamedArgs,
    semantics: &Semantics,
    active: &Mutability,
) -> Result<Vec<Value>, EvalError> {
    let callee = || descriptor.render(receiver_type);

    let mut named: Vec<(Name, Option<Value>)> =
        named.into_iter().map(|(key, value)| (key, Some(value))).collect();
    let mut positional = positional.into_iter();
    let num_positional_args = positional.len();

    let mut args = Vec::with_capacity(descriptor.params.len().saturating_add(2));
    let mut disabled: SmallVec<[&ParamDescriptor; 2]> = SmallVec::new();
    let mut positional_params: usize = 0;

    for param in descriptor.params {
        if let Some(gate) = param.gate {
            if !gate.is_enabled(semantics) {
                args.push(param.disabled_value.to_value(active));
                disabled.push(param);
                continue;
            }
        }
        if param.positional {
            positional_params = positional_params.saturating_add(1);
        }

        let value = if let Some(value) = param.positional.then(|| positional.next()).flatten() {
            if param.named && find_named(&named, param.name).is_some() {
                return Err(multiple_values(&callee(), param.name));
            }
            value
        } else if let Some(value) = param
            .named
            .then(|| take_named(&mut named, param.name))
            .flatten()
        {
            value
        } else if let Some(default) = param.default {
            args.push(default.to_value(active));
            continue;
        } else if !param.named && find_named(&named, param.name).is_some() {
            return Err(not_named(param.name, &callee()));
        } else {
            return Err(no_default(param.name, &callee()));
        };

        check_param(param, &value, &callee)?;
        args.push(value);
    }

    let rest: Vec<Value> = positional.collect();
    if descriptor.extra_positional {
        args.push(Value::tuple(rest));
    } else if !rest.is_empty() {
        return Err(too_many_for_descriptor(
            positional_params,
            num_positional_args,
            &callee(),
        ));
    }

    let leftover = named
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)));
    if descriptor.extra_keyword {
        let mut kwargs = DictEntries::default();
        for (key, value) in leftover {
            if kwargs
                .insert(HashKey::new(Value::string(&key))?, value)
                .is_some()
            {
                return Err(multiple_values(&callee(), &key));
            }
        }
        args.push(Value::dict(kwargs, active));
    } else {
        let mut unexpected: SmallVec<[Name; 4]> = leftover.map(|(key, _)| key).collect();
        if !unexpected.is_empty() {
            for param in &disabled {
                if let Some(gate) = param.gate {
                    if unexpected.iter().any(|key| key.as_str() == param.name) {
                        return Err(match gate.polarity {
                            GatePolarity::Deprecated => deprecated_parameter(param.name, gate.flag),
                            GatePolarity::Experimental => {
                                experimental_parameter(param.name, gate.flag)
                            }
                        });
                    }
                }
            }
            unexpected.sort();
            return Err(unexpected_keywords(&unexpected, &callee()));
        }
    }

    Ok(args)
}

/// `None` passes only noneable parameters; `Any` parameters accept it too.
fn check_param(
    param: &ParamDescriptor,
    value: &Value,
    callee: &impl Fn() -> String,
) -> Result<(), EvalError> {
    if value.is_none() {
        if param.noneable || param.ty == ParamType::Any {
            return Ok(());
        }
        return Err(none_not_allowed(param.name, &callee()));
    }
    if param.ty.accepts(value) {
        Ok(())
    } else {
        Err(argument_type(param.ty.name(), param.name, &callee()))
    }
}

fn find_named(named: &[(Name, Option<Value>)], key: &str) -> Option<usize> {
    named
        .iter()
        .position(|(name, value)| value.is_some() && name.as_str() == key)
}

fn take_named(named: &mut [(Name, Option<Value>)], key: &str) -> Option<Value> {
    let pos = find_named(named, key)?;
    named[pos].1.take()
}
