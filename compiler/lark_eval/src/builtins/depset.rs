//! Depset methods.

use crate::depset::union as depset_union;
use crate::dispatch::{Extras, Invocation, MethodDescriptor, ParamDescriptor, ParamType};
use crate::errors::{depset_union_disabled, internal, EvalAbort};
use crate::semantics::flags;
use crate::value::Value;

type Result<T = Value> = std::result::Result<T, EvalAbort>;

pub(super) static METHODS: &[MethodDescriptor] = &[
    MethodDescriptor::new("to_list", "to_list", &[], to_list),
    MethodDescriptor::new(
        "union",
        "union",
        &[ParamDescriptor::positional("new_elements", ParamType::Any)],
        union,
    )
    .with_extras(Extras::SEMANTICS),
];

fn to_list(inv: &mut Invocation<'_>) -> Result {
    let Value::Depset(set) = inv.receiver()? else {
        return Err(internal("depset method invoked on a non-depset").into());
    };
    Ok(Value::list(set.to_list()?, &inv.mutability()?))
}

fn union(inv: &mut Invocation<'_>) -> Result {
    if inv.semantics()?.flag(flags::INCOMPATIBLE_DEPSET_UNION) {
        return Err(depset_union_disabled("union() method").into());
    }
    let Value::Depset(set) = inv.receiver()? else {
        return Err(internal("depset method invoked on a non-depset").into());
    };
    Ok(Value::depset(depset_union(set, inv.arg(0)?)?))
}
