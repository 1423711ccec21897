#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::semantics::flags;

fn noop(_: &mut Invocation<'_>) -> Result<Value, EvalAbort> {
    Ok(Value::None)
}

static X_PARAMS: [ParamDescriptor; 1] = [ParamDescriptor::either("x", ParamType::Int)];

static PLAIN: [MethodDescriptor; 3] = [
    MethodDescriptor::new("zeta", "zeta", &[], noop),
    MethodDescriptor::new("alpha", "alpha", &X_PARAMS, noop),
    MethodDescriptor::new("size", "size_field", &[], noop).struct_field(),
];

static CALLABLE: MethodDescriptor = MethodDescriptor::new("call", "call", &[], noop).self_call();
static CALLABLE_AGAIN: MethodDescriptor =
    MethodDescriptor::new("invoke", "invoke", &[], noop).self_call();

static NEW_ONLY: MethodDescriptor =
    MethodDescriptor::new("shiny", "shiny", &[], noop).gated(FlagGate::experimental("experimental_shiny"));
static OLD_ONLY: MethodDescriptor =
    MethodDescriptor::new("rusty", "rusty", &[], noop).gated(FlagGate::deprecated("incompatible_rusty"));

static FIELD_B: MethodDescriptor = MethodDescriptor::new("n", "b_field", &[], noop).struct_field();
static FIELD_A: MethodDescriptor = MethodDescriptor::new("n", "a_field", &[], noop).struct_field();

static DUP_B: MethodDescriptor = MethodDescriptor::new("m", "b_member", &[], noop);
static DUP_A: MethodDescriptor = MethodDescriptor::new("m", "a_member", &[], noop);

fn registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry.register_all(TypeTag::Struct, &PLAIN);
    registry.register(TypeTag::Struct, &CALLABLE);
    registry.register(TypeTag::Struct, &NEW_ONLY);
    registry.register(TypeTag::Struct, &OLD_ONLY);
    registry
}

#[test]
fn table_lists_methods_and_fields() {
    let table = DispatchTable::build(TypeTag::Struct, &registry(), &Semantics::default()).unwrap();
    assert_eq!(table.names(), vec!["alpha", "rusty", "size", "zeta"]);
    assert_eq!(table.get("alpha").map(|d| d.member), Some("alpha"));
    assert_eq!(table.field("size").map(|d| d.member), Some("size_field"));
    assert!(table.field("alpha").is_none());
    assert_eq!(table.self_call().map(|d| d.name), Some("call"));
}

#[test]
fn gates_filter_by_semantics() {
    let registry = registry();
    let semantics = Semantics::builder()
        .set("experimental_shiny", true)
        .set("incompatible_rusty", true)
        .build();
    let table = DispatchTable::build(TypeTag::Struct, &registry, &semantics).unwrap();
    assert!(table.get("shiny").is_some());
    assert!(table.get("rusty").is_none());
}

#[test]
fn duplicate_self_call_is_rejected() {
    let mut registry = registry();
    registry.register(TypeTag::Struct, &CALLABLE_AGAIN);
    let err = DispatchTable::build(TypeTag::Struct, &registry, &Semantics::default()).unwrap_err();
    assert_eq!(
        err,
        DispatchError::DuplicateSelfCall {
            type_name: "struct",
            first: "call",
            second: "invoke",
        }
    );
}

#[test]
fn duplicate_fields_reported_in_member_order() {
    let mut registry = MethodRegistry::new();
    registry.register(TypeTag::Int, &FIELD_B);
    registry.register(TypeTag::Int, &FIELD_A);
    let err = DispatchTable::build(TypeTag::Int, &registry, &Semantics::default()).unwrap_err();
    assert_eq!(
        err,
        DispatchError::DuplicateStructField {
            type_name: "int",
            name: "n",
            first: "a_field",
            second: "b_field",
        }
    );
}

#[test]
fn duplicate_methods_reported_in_member_order() {
    let mut registry = MethodRegistry::new();
    registry.register(TypeTag::Int, &DUP_B);
    registry.register(TypeTag::Int, &DUP_A);
    let err = DispatchTable::build(TypeTag::Int, &registry, &Semantics::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "type 'int' has two methods named 'm': 'a_member' and 'b_member'"
    );
}

#[test]
fn render_descriptor() {
    assert_eq!(PLAIN[1].render(TypeTag::Universe), "function alpha(x)");
    assert_eq!(PLAIN[1].render(TypeTag::List), "method alpha(x) of 'list'");
}

#[test]
fn cache_builds_each_key_once() {
    let cache = DispatchCache::new(registry());
    let semantics = Semantics::default();
    let first = cache.table(TypeTag::Struct, &semantics).unwrap();
    let second = cache.table(TypeTag::Struct, &semantics).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.builds(), 1);

    let other = Semantics::builder().set("experimental_shiny", true).build();
    cache.table(TypeTag::Struct, &other).unwrap();
    assert_eq!(cache.builds(), 2);

    // An explicit false is the same snapshot as the default.
    let explicit = Semantics::builder().set("experimental_shiny", false).build();
    cache.table(TypeTag::Struct, &explicit).unwrap();
    assert_eq!(cache.builds(), 2);
}

#[test]
fn cache_is_shared_across_threads() {
    let cache = DispatchCache::new(registry());
    let semantics = Semantics::default();
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let table = cache.table(TypeTag::Struct, &semantics).unwrap();
                    assert!(table.get("alpha").is_some());
                }
            });
        }
    });
    assert_eq!(cache.builds(), 1);
}

#[test]
fn cache_remembers_failures() {
    let mut registry = MethodRegistry::new();
    registry.register(TypeTag::Int, &DUP_A);
    registry.register(TypeTag::Int, &DUP_B);
    let cache = DispatchCache::new(registry);
    assert!(cache.table(TypeTag::Int, &Semantics::default()).is_err());
    assert!(cache.table(TypeTag::Int, &Semantics::default()).is_err());
    assert_eq!(cache.builds(), 1);
}

#[test]
fn builtin_library_is_consistent() {
    let cache = DispatchCache::shared();
    let all_on = Semantics::builder()
        .set(flags::EXPERIMENTAL_STRING_PREFIX_METHODS, true)
        .set(flags::INCOMPATIBLE_DEPSET_UNION, true)
        .set(flags::INCOMPATIBLE_DISABLE_DEPSET_ITEMS, true)
        .build();
    for semantics in [Semantics::default(), all_on] {
        for tag in [
            TypeTag::Universe,
            TypeTag::String,
            TypeTag::List,
            TypeTag::Dict,
            TypeTag::Depset,
            TypeTag::Struct,
        ] {
            assert!(cache.table(tag, &semantics).is_ok(), "{tag:?}");
        }
    }
}

#[test]
fn string_prefix_methods_are_experimental() {
    let cache = DispatchCache::shared();
    let off = cache.table(TypeTag::String, &Semantics::default()).unwrap();
    assert!(off.get("removeprefix").is_none());
    assert!(off.get("startswith").is_some());
    let on = Semantics::builder()
        .set(flags::EXPERIMENTAL_STRING_PREFIX_METHODS, true)
        .build();
    let on = cache.table(TypeTag::String, &on).unwrap();
    assert!(on.get("removeprefix").is_some());
    assert!(on.get("removesuffix").is_some());
}
