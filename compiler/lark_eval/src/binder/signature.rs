use lark_ir::Name;
use smallvec::SmallVec;

use super::NamedArgs;
use crate::errors::{
    insufficient_arguments, internal, missing_mandatory_keywords, missing_named_only,
    missing_positional, multiple_values, no_positional_accepted, passed_both,
    too_many_positional, unexpected_keywords, EvalError,
};
use crate::mutability::Mutability;
use crate::signature::FunctionSignature;
use crate::value::{DictEntries, HashKey, Value};

/// Bind arguments to the parameters of an interpreter-defined function.
///
/// Returns one value per parameter in canonical order: positional
/// parameters, named-only parameters, then the `*args` tuple and the
/// `**kwargs` dict when declared. `defaults` holds the values of the optional
/// slots; `name` is only used to render the callee in errors. The `**kwargs`
/// dict is created in `active`.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "slot indices are sums of one signature's parameter counts"
)]
pub fn bind_signature(
    signature: &FunctionSignature,
    defaults: &[Value],
    name: &str,
    mut positional: Vec<Value>,
    named: NamedArgs,
    active: &Mutability,
) -> Result<Vec<Value>, EvalError> {
    let callee = || signature.render(name, Some(defaults));

    let mandatory_positional = signature.num_mandatory_positional();
    let num_positional_params = signature.num_positional();
    let optional_named_end = num_positional_params + signature.num_optional_named_only();
    let num_named_params = num_positional_params + signature.num_named_only();
    let star_index = num_named_params;
    let star_star_index = num_named_params + usize::from(signature.has_star());

    let mut slots: Vec<Option<Value>> = vec![None; signature.num_parameters()];

    let num_positional_args = positional.len();
    if num_positional_args > num_positional_params {
        if !signature.has_star() {
            return Err(if num_positional_params == 0 {
                no_positional_accepted(&callee(), num_positional_args)
            } else {
                too_many_positional(num_positional_args, &callee())
            });
        }
        let rest = positional.split_off(num_positional_params);
        slots[star_index] = Some(Value::tuple(rest));
    } else if signature.has_star() {
        slots[star_index] = Some(Value::tuple(Vec::new()));
    }
    let bound_positional = positional.len();
    for (slot, value) in slots.iter_mut().zip(positional) {
        *slot = Some(value);
    }

    if named.is_empty() {
        if bound_positional < mandatory_positional {
            return Err(insufficient_arguments(
                &callee(),
                num_positional_args,
                mandatory_positional,
            ));
        }
        if signature.num_mandatory_named_only() > 0 {
            return Err(missing_mandatory_keywords(&callee()));
        }
        if signature.has_star_star() {
            slots[star_star_index] = Some(Value::empty_dict(active));
        }
    } else if num_named_params == 0 && signature.has_star_star() {
        let mut kwargs = DictEntries::default();
        for (key, value) in named {
            insert_kwarg(&mut kwargs, &key, value, &callee)?;
        }
        slots[star_star_index] = Some(Value::dict(kwargs, active));
    } else {
        let names = &signature.names()[..num_named_params];

        let mut both: SmallVec<[Name; 4]> = names[..bound_positional]
            .iter()
            .filter(|param| named.iter().any(|(key, _)| key == *param))
            .cloned()
            .collect();
        if !both.is_empty() {
            both.sort();
            return Err(passed_both(&both, &callee()));
        }

        let mut kwargs = signature.has_star_star().then(DictEntries::default);
        let mut unexpected: SmallVec<[Name; 4]> = SmallVec::new();
        for (key, value) in named {
            if let Some(pos) = names.iter().position(|param| *param == key) {
                if slots[pos].is_some() {
                    return Err(multiple_values(&callee(), &key));
                }
                slots[pos] = Some(value);
            } else if let Some(kwargs) = kwargs.as_mut() {
                insert_kwarg(kwargs, &key, value, &callee)?;
            } else {
                unexpected.push(key);
            }
        }
        if !unexpected.is_empty() {
            unexpected.sort();
            return Err(unexpected_keywords(&unexpected, &callee()));
        }
        if let Some(kwargs) = kwargs {
            slots[star_star_index] = Some(Value::dict(kwargs, active));
        }

        for (pos, param) in names.iter().enumerate().take(mandatory_positional) {
            if slots[pos].is_none() {
                return Err(missing_positional(param, &callee()));
            }
        }
        for (pos, param) in names.iter().enumerate().skip(optional_named_end) {
            if slots[pos].is_none() {
                return Err(missing_named_only(param, &callee()));
            }
        }
    }

    let optional_end = mandatory_positional + signature.num_optionals();
    for pos in mandatory_positional..optional_end {
        if slots[pos].is_none() {
            let default = defaults.get(pos - mandatory_positional).cloned().ok_or_else(|| {
                internal(format!("missing default value for parameter {pos} of {}", callee()))
            })?;
            slots[pos] = Some(default);
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(pos, slot)| {
            slot.ok_or_else(|| internal(format!("parameter {pos} of {} left unbound", callee())))
        })
        .collect()
}

fn insert_kwarg(
    kwargs: &mut DictEntries,
    key: &Name,
    value: Value,
    callee: &impl Fn() -> String,
) -> Result<(), EvalError> {
    if kwargs
        .insert(HashKey::new(Value::string(key))?, value)
        .is_some()
    {
        return Err(multiple_values(&callee(), key));
    }
    Ok(())
}
