//! Calls: argument evaluation at call sites, user functions and host
//! methods.

use lark_ir::{Argument, CallExpr, Expr, Location, Name};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::instrument;

use super::stmt::Control;
use super::{Interpreter, Thread};
use crate::binder::{bind_descriptor, bind_signature, NamedArgs};
use crate::dispatch::{Extras, Invocation, MethodDescriptor};
use crate::errors::{
    call_depth_exceeded, duplicate_keywords, keywords_not_strings, not_callable, recursion,
    star_not_iterable, star_star_not_dict, EvalResult,
};
use crate::value::{BuiltinFunction, Heap, TypeTag, UserFunction, Value};

impl Interpreter<'_> {
    /// Evaluate a call expression: the callee, then each argument left to
    /// right, then the call itself.
    pub(crate) fn eval_call(&mut self, call: &CallExpr, expr: &Expr) -> EvalResult {
        self.thread.check_cancelled()?;
        let callee = self.eval(&call.function)?;

        let mut positional = Vec::with_capacity(call.args.len());
        let mut named: NamedArgs = Vec::new();
        for arg in &call.args {
            match arg {
                Argument::Positional(value) => positional.push(self.eval(value)?),
                Argument::Keyword(name, value) => named.push((name.clone(), self.eval(value)?)),
                Argument::Star(value) => {
                    let value = self.eval(value)?;
                    match &value {
                        Value::List(_) | Value::Tuple(_) | Value::Dict(_) | Value::Depset(_) => {
                            positional.extend(value.iterate(self.thread.semantics())?);
                        }
                        other => return Err(star_not_iterable(other.type_name()).into()),
                    }
                }
                Argument::StarStar(value) => {
                    let value = self.eval(value)?;
                    let Value::Dict(dict) = &value else {
                        return Err(star_star_not_dict(value.type_name()).into());
                    };
                    for (key, value) in dict.items() {
                        match key.as_str() {
                            Some(key) => named.push((Name::from(key), value)),
                            None => return Err(keywords_not_strings(key.type_name()).into()),
                        }
                    }
                }
            }
        }
        check_duplicate_keywords(&callee, &named)?;

        call_value(
            self.thread,
            &callee,
            positional,
            named,
            &expr.location,
            Some(expr),
        )
    }
}

fn check_duplicate_keywords(callee: &Value, named: &NamedArgs) -> EvalResult<()> {
    let mut seen = FxHashSet::default();
    let mut duplicates: Vec<Name> = named
        .iter()
        .filter(|(name, _)| !seen.insert(name.as_str()))
        .map(|(name, _)| name.clone())
        .collect();
    if duplicates.is_empty() {
        return Ok(());
    }
    duplicates.sort();
    duplicates.dedup();
    Err(duplicate_keywords(&duplicates, &callee_name(callee)).into())
}

fn callee_name(callee: &Value) -> String {
    match callee {
        Value::Function(f) => f.name().to_string(),
        Value::Builtin(b) => b.name().to_string(),
        other => other.type_name().to_string(),
    }
}

/// Call any callable value.
///
/// Errors leaving the callee are attributed to `location` and gain a stack
/// frame naming the callee. Cancellation propagates untouched.
pub(crate) fn call_value(
    thread: &mut Thread,
    callee: &Value,
    positional: Vec<Value>,
    named: NamedArgs,
    location: &Location,
    call: Option<&Expr>,
) -> EvalResult {
    let result = match callee {
        Value::Function(function) => call_user(thread, function, positional, named, location),
        Value::Builtin(builtin) => call_builtin(thread, builtin, positional, named, location, call),
        other => {
            let tag = other.type_tag();
            match thread.table(tag)?.self_call() {
                Some(descriptor) => invoke(
                    thread,
                    descriptor,
                    tag,
                    Some(other.clone()),
                    positional,
                    named,
                    location,
                    call,
                ),
                None => Err(not_callable(other.type_name()).into()),
            }
        }
    };
    result.map_err(|err| err.in_frame(&callee_name(callee), location))
}

/// Run the body of a user function with freshly bound parameters.
#[instrument(level = "trace", skip_all, fields(function = %function.name()))]
pub(crate) fn call_user(
    thread: &mut Thread,
    function: &Heap<UserFunction>,
    positional: Vec<Value>,
    named: NamedArgs,
    location: &Location,
) -> EvalResult {
    if thread.call_depth() >= thread.max_call_depth() {
        return Err(call_depth_exceeded(thread.max_call_depth()).into());
    }
    if thread.is_active(function.addr()) {
        return Err(recursion(function.name(), thread.caller_name()).into());
    }

    let args = bind_signature(
        function.signature(),
        function.defaults(),
        function.name(),
        positional,
        named,
        thread.mutability(),
    )
    .map_err(|err| err.with_location(location))?;
    let locals: FxHashMap<Name, Value> = function
        .signature()
        .names()
        .iter()
        .cloned()
        .zip(args)
        .collect();

    thread.push_call(function.addr(), function.name().clone());
    let outcome = {
        let mut interp = Interpreter::for_call(
            thread,
            function.module().clone(),
            function.name().clone(),
            locals,
        );
        interp.exec_block(function.body())
    };
    thread.pop_call();

    match outcome? {
        Control::Return(value) => Ok(value),
        Control::Pass | Control::Break | Control::Continue => Ok(Value::None),
    }
}

fn call_builtin(
    thread: &mut Thread,
    builtin: &BuiltinFunction,
    positional: Vec<Value>,
    named: NamedArgs,
    location: &Location,
    call: Option<&Expr>,
) -> EvalResult {
    invoke(
        thread,
        builtin.descriptor(),
        builtin.receiver_type(),
        builtin.receiver().cloned(),
        positional,
        named,
        location,
        call,
    )
}

/// Bind arguments to `descriptor`, attach the extras it asks for, and run
/// it.
#[allow(clippy::too_many_arguments)]
fn invoke(
    thread: &mut Thread,
    descriptor: &'static MethodDescriptor,
    receiver_type: TypeTag,
    receiver: Option<Value>,
    positional: Vec<Value>,
    named: NamedArgs,
    location: &Location,
    call: Option<&Expr>,
) -> EvalResult {
    let args = bind_descriptor(
        descriptor,
        receiver_type,
        positional,
        named,
        thread.semantics(),
        thread.mutability(),
    )?;
    let semantics = thread.semantics().clone();

    let mut invocation = Invocation::new(descriptor, receiver_type, receiver, args);
    let extras = descriptor.extras;
    if extras.contains(Extras::LOCATION) {
        invocation.set_location(location.clone());
    }
    if extras.contains(Extras::CALL_EXPR) {
        if let Some(call) = call {
            invocation.set_call_expr(call);
        }
    }
    // Always attached: `Invocation::mutability` reads the domain from it.
    invocation.set_thread(thread);
    if extras.contains(Extras::SEMANTICS) {
        invocation.set_semantics(semantics);
    }
    (descriptor.imp)(&mut invocation)
}
