#![allow(clippy::unwrap_used, clippy::expect_used)]

use lark_ir::Name;
use pretty_assertions::assert_eq;

use super::*;
use crate::dispatch::{
    DefaultValue, FlagGate, Invocation, MethodDescriptor, ParamDescriptor, ParamType,
};
use crate::errors::{EvalAbort, EvalErrorKind};
use crate::mutability::Mutability;
use crate::semantics::Semantics;
use crate::signature::FunctionSignature;
use crate::value::{TypeTag, Value};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::int).collect()
}

fn kw(pairs: &[(&str, i64)]) -> NamedArgs {
    pairs
        .iter()
        .map(|(name, value)| (Name::from(*name), Value::int(*value)))
        .collect()
}

fn bind(
    text: &str,
    defaults: &[Value],
    positional: &[i64],
    named: &[(&str, i64)],
) -> Result<Vec<Value>, crate::errors::EvalError> {
    let signature: FunctionSignature = text.parse().unwrap();
    bind_signature(
        &signature,
        defaults,
        "f",
        ints(positional),
        kw(named),
        &Mutability::new("test"),
    )
}

fn message(result: Result<Vec<Value>, crate::errors::EvalError>) -> String {
    result.unwrap_err().message
}

// Signature binder

#[test]
fn positional_and_keyword_fill_slots() {
    let args = bind("a, b, c = ?", &ints(&[10]), &[1, 2], &[("c", 3)]).unwrap();
    assert_eq!(args, ints(&[1, 2, 3]));
}

#[test]
fn defaults_fill_missing_optionals() {
    let args = bind("a, b = ?, c = ?", &ints(&[20, 30]), &[1], &[("c", 3)]).unwrap();
    assert_eq!(args, ints(&[1, 20, 3]));
}

#[test]
fn defaults_skip_over_mandatory_named_only() {
    // canonical: a, b, d, c ; defaults cover b and d
    let args = bind("a, b = ?, *, c, d = ?", &ints(&[2, 4]), &[1], &[("c", 3)]).unwrap();
    assert_eq!(args, ints(&[1, 2, 4, 3]));
}

#[test]
fn passed_both_names_the_parameter() {
    let err = bind("a, b, c = ?", &ints(&[10]), &[1], &[("b", 2), ("a", 3)]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::PassedTwice);
    assert_eq!(
        err.message,
        "argument 'a' passed both by position and by name in call to f(a, b, c = 10)"
    );
}

#[test]
fn passed_both_lists_every_name_sorted() {
    let msg = message(bind("b, a", &[], &[1, 2], &[("b", 3), ("a", 4)]));
    assert_eq!(
        msg,
        "arguments 'a', 'b' passed both by position and by name in call to f(b, a)"
    );
}

#[test]
fn too_many_positional() {
    assert_eq!(
        message(bind("a", &[], &[1, 2], &[])),
        "too many (2) positional arguments in call to f(a)"
    );
    assert_eq!(
        message(bind("*, a", &[], &[1], &[("a", 1)])),
        "f(*, a) does not accept positional arguments, but got 1"
    );
}

#[test]
fn excess_positional_goes_to_varargs() {
    let args = bind("a, *rest", &[], &[1, 2, 3], &[]).unwrap();
    assert_eq!(args, vec![Value::int(1), Value::tuple(ints(&[2, 3]))]);
}

#[test]
fn insufficient_without_keywords() {
    let err = bind("a, b", &[], &[1], &[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Arity);
    assert_eq!(
        err.message,
        "insufficient arguments received by f(a, b) (got 1, expected at least 2)"
    );
}

#[test]
fn mandatory_named_only_needs_keywords() {
    assert_eq!(
        message(bind("a, *, b", &[], &[1], &[])),
        "missing mandatory keyword arguments in call to f(a, *, b)"
    );
    assert_eq!(
        message(bind("a, *, b, c", &[], &[1], &[("c", 3)])),
        "missing mandatory named-only argument 'b' while calling f(a, *, b, c)"
    );
}

#[test]
fn missing_positional_with_keywords() {
    assert_eq!(
        message(bind("a, b", &[], &[], &[("b", 1)])),
        "missing mandatory positional argument 'a' while calling f(a, b)"
    );
}

#[test]
fn unexpected_keywords_are_sorted() {
    let err = bind("a", &[], &[1], &[("zeta", 1), ("alpha", 2)]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UnexpectedKeyword);
    assert_eq!(
        err.message,
        "unexpected keywords 'alpha', 'zeta' in call to f(a)"
    );
}

#[test]
fn keywords_go_to_kwargs_fast_path() {
    let args = bind("**kw", &[], &[], &[("x", 1), ("y", 2)]).unwrap();
    assert_eq!(args.len(), 1);
    let Value::Dict(dict) = &args[0] else {
        panic!("expected dict, got {:?}", args[0]);
    };
    assert_eq!(dict.keys(), vec![Value::string("x"), Value::string("y")]);
}

#[test]
fn full_signature() {
    let args = bind("a, b = ?, *c, **d", &ints(&[2]), &[1, 3, 4], &[("e", 5)]).unwrap();
    assert_eq!(args[0], Value::int(1));
    assert_eq!(args[1], Value::int(3));
    assert_eq!(args[2], Value::tuple(ints(&[4])));
    assert_eq!(args[3].repr(), "{\"e\": 5}");
}

#[test]
fn empty_star_and_star_star_are_bound() {
    let args = bind("*a, **k", &[], &[], &[]).unwrap();
    assert_eq!(args[0], Value::tuple(Vec::new()));
    assert_eq!(args[1].repr(), "{}");
}

#[test]
fn duplicate_kwargs_entry_is_multiple_values() {
    let err = bind("**k", &[], &[], &[("x", 1), ("x", 2)]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::MultipleValues);
}

// Descriptor binder

fn noop(_: &mut Invocation<'_>) -> Result<Value, EvalAbort> {
    Ok(Value::None)
}

static GET_PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::positional("key", ParamType::Any),
    ParamDescriptor::positional("default", ParamType::Any).with_default(DefaultValue::None),
];
static GET: MethodDescriptor = MethodDescriptor::new("get", "get", &GET_PARAMS, noop);

static JOIN_PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::either("sep", ParamType::String)];
static JOIN: MethodDescriptor = MethodDescriptor::new("join", "join", &JOIN_PARAMS, noop);

static FIND_PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::positional("sub", ParamType::String),
    ParamDescriptor::either("start", ParamType::Int)
        .with_default(DefaultValue::Int(0))
        .noneable(),
];
static FIND: MethodDescriptor = MethodDescriptor::new("find", "find", &FIND_PARAMS, noop);

static VARARGS: MethodDescriptor =
    MethodDescriptor::new("print", "print", &[], noop).with_varargs().with_kwargs();

static GATED_PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::either("x", ParamType::Any).with_default(DefaultValue::None),
    ParamDescriptor::named("items", ParamType::Sequence)
        .with_default(DefaultValue::EmptyList)
        .gated(FlagGate::deprecated("incompatible_no_items"), DefaultValue::None),
];
static GATED: MethodDescriptor = MethodDescriptor::new("make", "make", &GATED_PARAMS, noop);

static PREVIEW_PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::named("fast", ParamType::Bool)
    .with_default(DefaultValue::Bool(false))
    .gated(FlagGate::experimental("experimental_fast"), DefaultValue::Bool(false))];
static PREVIEW: MethodDescriptor =
    MethodDescriptor::new("preview", "preview", &PREVIEW_PARAMS, noop);

fn bind_host(
    descriptor: &MethodDescriptor,
    positional: Vec<Value>,
    named: NamedArgs,
    semantics: &Semantics,
) -> Result<Vec<Value>, crate::errors::EvalError> {
    bind_descriptor(
        descriptor,
        TypeTag::Dict,
        positional,
        named,
        semantics,
        &Mutability::new("test"),
    )
}

#[test]
fn descriptor_defaults_fill_in() {
    let args = bind_host(&GET, ints(&[1]), Vec::new(), &Semantics::default()).unwrap();
    assert_eq!(args, vec![Value::int(1), Value::None]);
}

#[test]
fn descriptor_type_mismatch() {
    let err = bind_host(&JOIN, ints(&[1]), Vec::new(), &Semantics::default()).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::ArgumentType);
    assert_eq!(
        err.message,
        "expected value of type 'string' for parameter 'sep', for call to method join(sep) of 'dict'"
    );
}

#[test]
fn descriptor_none_rejected_unless_noneable() {
    let err = bind_host(&JOIN, vec![Value::None], Vec::new(), &Semantics::default()).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NoneNotAllowed);
    let args = bind_host(
        &FIND,
        vec![Value::string("a"), Value::None],
        Vec::new(),
        &Semantics::default(),
    )
    .unwrap();
    assert_eq!(args[1], Value::None);
}

#[test]
fn descriptor_keyword_binding() {
    let args = bind_host(
        &JOIN,
        Vec::new(),
        vec![(Name::from("sep"), Value::string(","))],
        &Semantics::default(),
    )
    .unwrap();
    assert_eq!(args, vec![Value::string(",")]);
}

#[test]
fn descriptor_positional_only_rejects_name() {
    let err = bind_host(
        &FIND,
        Vec::new(),
        vec![(Name::from("sub"), Value::string("a"))],
        &Semantics::default(),
    )
    .unwrap_err();
    assert_eq!(
        err.message,
        "parameter 'sub' may not be specified by name, for call to method find(sub, start = 0) of 'dict'"
    );
}

#[test]
fn descriptor_missing_argument() {
    let err = bind_host(&GET, Vec::new(), Vec::new(), &Semantics::default()).unwrap_err();
    assert_eq!(
        err.message,
        "parameter 'key' has no default value, for call to method get(key, default = None) of 'dict'"
    );
}

#[test]
fn descriptor_multiple_values() {
    let err = bind_host(
        &FIND,
        vec![Value::string("a"), Value::int(1)],
        kw(&[("start", 2)]),
        &Semantics::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::MultipleValues);
}

#[test]
fn descriptor_too_many_positional() {
    let err = bind_host(&GET, ints(&[1, 2, 3]), Vec::new(), &Semantics::default()).unwrap_err();
    assert_eq!(
        err.message,
        "expected no more than 2 positional arguments, but got 3, for call to method get(key, default = None) of 'dict'"
    );
}

#[test]
fn descriptor_varargs_and_kwargs() {
    let args = bind_host(&VARARGS, ints(&[1, 2]), kw(&[("sep", 0)]), &Semantics::default())
        .unwrap();
    assert_eq!(args[0], Value::tuple(ints(&[1, 2])));
    assert_eq!(args[1].repr(), "{\"sep\": 0}");
}

#[test]
fn descriptor_unexpected_keywords_sorted() {
    let err = bind_host(&GET, ints(&[1]), kw(&[("z", 1), ("b", 2)]), &Semantics::default())
        .unwrap_err();
    assert_eq!(
        err.message,
        "unexpected keywords 'b', 'z' in call to method get(key, default = None) of 'dict'"
    );
}

#[test]
fn deprecated_parameter_hint() {
    let on = Semantics::builder().set("incompatible_no_items", true).build();
    let args = bind_host(&GATED, Vec::new(), Vec::new(), &on).unwrap();
    assert_eq!(args, vec![Value::None, Value::None]);

    let err = bind_host(&GATED, Vec::new(), kw(&[("items", 1)]), &on).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::DisabledParameter {
            flag: "incompatible_no_items".into()
        }
    );
    assert!(err.message.contains("--incompatible_no_items=false"));

    let off = Semantics::default();
    let args = bind_host(
        &GATED,
        Vec::new(),
        vec![(Name::from("items"), Value::tuple(Vec::new()))],
        &off,
    )
    .unwrap();
    assert_eq!(args[1], Value::tuple(Vec::new()));
}

#[test]
fn experimental_parameter_hint() {
    let err = bind_host(
        &PREVIEW,
        Vec::new(),
        vec![(Name::from("fast"), Value::Bool(true))],
        &Semantics::default(),
    )
    .unwrap_err();
    assert!(err.message.contains("is experimental"));
    assert!(err.message.contains("--experimental_fast"));

    let on = Semantics::builder().set("experimental_fast", true).build();
    let args = bind_host(
        &PREVIEW,
        Vec::new(),
        vec![(Name::from("fast"), Value::Bool(true))],
        &on,
    )
    .unwrap();
    assert_eq!(args, vec![Value::Bool(true)]);
}
