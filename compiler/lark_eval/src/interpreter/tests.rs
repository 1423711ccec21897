#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use lark_ir::build::{assign, binary, call, def, file, ident, int, pos, ret, string};
use lark_ir::BinaryOp;
use pretty_assertions::assert_eq;

use super::*;
use crate::dispatch::{DispatchCache, MethodRegistry};
use crate::errors::EvalErrorKind;
use crate::print_handler::silent_handler;
use crate::value::{TypeTag, Value};

fn thread(label: &str) -> Thread {
    Thread::builder(label).print_handler(silent_handler()).build()
}

#[test]
fn normalize_index_handles_negative_positions() {
    assert_eq!(normalize_index(0, 3), Some(0));
    assert_eq!(normalize_index(-1, 3), Some(2));
    assert_eq!(normalize_index(-3, 3), Some(0));
    assert_eq!(normalize_index(-4, 3), None);
    assert_eq!(normalize_index(3, 3), None);
    assert_eq!(normalize_index(0, 0), None);
}

#[test]
fn module_keeps_definition_order() {
    let t = thread("m");
    let module = t.new_module("m");
    module.set(Name::from("zeta"), Value::int(1)).unwrap();
    module.set(Name::from("alpha"), Value::int(2)).unwrap();
    module.set(Name::from("zeta"), Value::int(3)).unwrap();
    assert_eq!(module.names(), vec![Name::from("zeta"), Name::from("alpha")]);
    assert_eq!(
        module.bindings(),
        vec![
            (Name::from("zeta"), Value::int(3)),
            (Name::from("alpha"), Value::int(2)),
        ]
    );
    assert!(module.contains("alpha"));
    assert_eq!(module.name(), "m");
}

#[test]
fn frozen_module_rejects_set() {
    let t = thread("m");
    let module = t.new_module("lib");
    module.set(Name::from("x"), Value::int(1)).unwrap();
    module.freeze();
    assert!(t.mutability().is_frozen());
    let err = module.set(Name::from("x"), Value::int(2)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::FrozenObject);
    assert_eq!(err.message, "cannot reassign global 'x' of frozen module 'lib'");
    assert_eq!(module.get("x"), Some(Value::int(1)));
}

#[test]
fn builder_defaults() {
    let t = Thread::builder("defaults").build();
    assert_eq!(t.max_call_depth(), DEFAULT_MAX_CALL_DEPTH);
    assert_eq!(t.call_depth(), 0);
    assert_eq!(t.mutability().label(), "defaults");
    assert!(!t.cancellation().is_cancelled());
    assert!(t.module("anything").is_none());
    assert!(Arc::ptr_eq(t.dispatch(), &DispatchCache::shared()));
}

#[test]
fn private_dispatch_cache() {
    let cache = Arc::new(DispatchCache::new(MethodRegistry::builtin()));
    let mut t = Thread::builder("private")
        .dispatch(Arc::clone(&cache))
        .print_handler(silent_handler())
        .build();
    assert_eq!(cache.builds(), 0);
    let module = t.new_module("m");
    exec_file(
        &mut t,
        &module,
        &file("m.lark", vec![assign(ident("n"), call(ident("len"), vec![pos(string("ab"))]))]),
    )
    .unwrap();
    assert_eq!(module.get("n"), Some(Value::int(2)));
    let after_first = cache.builds();
    assert!(after_first >= 1);
    t.table(TypeTag::Universe).unwrap();
    assert_eq!(cache.builds(), after_first);
}

#[test]
fn threads_are_independent_domains() {
    let a = thread("a");
    let b = thread("b");
    assert!(!a.mutability().same_domain(b.mutability()));
    let module = a.new_module("m");
    drop(a);
    assert!(module.is_frozen());
    assert!(!b.mutability().is_frozen());
}

#[test]
fn eval_expression_sees_module_globals() {
    let mut t = thread("t");
    let module = t.new_module("m");
    exec_file(
        &mut t,
        &module,
        &file(
            "m.lark",
            vec![
                assign(ident("base"), int(40)),
                def(
                    "plus_two",
                    vec![],
                    vec![ret(binary(ident("base"), BinaryOp::Plus, int(2)))],
                ),
            ],
        ),
    )
    .unwrap();
    let result = eval_expression(&mut t, &module, &call(ident("plus_two"), vec![])).unwrap();
    assert_eq!(result, Value::int(42));
    assert_eq!(t.call_depth(), 0);
}

#[test]
fn call_function_rejects_non_callables() {
    let mut t = thread("t");
    let err = call_function(&mut t, &Value::int(1), Vec::new(), Vec::new(), &Location::builtin())
        .unwrap_err();
    let err = err.as_error().unwrap();
    assert_eq!(err.kind, EvalErrorKind::NotCallable);
}
