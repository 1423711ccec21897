#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]

use std::cmp::Ordering;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::depset::{Depset, Order, MAX_DEPTH};
use crate::errors::EvalErrorKind;
use crate::mutability::Mutability;

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::int).collect()
}

fn dict_of(pairs: &[(&str, i64)], mutability: &Mutability) -> Value {
    let mut entries = DictEntries::default();
    for (k, v) in pairs {
        entries.insert(HashKey::new(Value::string(k)).unwrap(), Value::int(*v));
    }
    Value::dict(entries, mutability)
}

#[test]
fn repr_of_scalars() {
    assert_eq!(Value::None.repr(), "None");
    assert_eq!(Value::Bool(true).repr(), "True");
    assert_eq!(Value::int(-3).repr(), "-3");
    assert_eq!(Value::string("a\"b\n").repr(), "\"a\\\"b\\n\"");
    assert_eq!(Value::string("plain").to_str(), "plain");
}

#[test]
fn repr_of_containers() {
    let m = Mutability::new("test");
    assert_eq!(Value::tuple(ints(&[1])).repr(), "(1,)");
    assert_eq!(Value::tuple(ints(&[1, 2])).repr(), "(1, 2)");
    assert_eq!(Value::tuple(Vec::new()).repr(), "()");
    assert_eq!(Value::list(ints(&[1, 2]), &m).repr(), "[1, 2]");
    assert_eq!(dict_of(&[("b", 1), ("a", 2)], &m).repr(), "{\"b\": 1, \"a\": 2}");
    let s = Value::structure(vec![
        (Name::from("z"), Value::string("last")),
        (Name::from("a"), Value::int(1)),
    ]);
    assert_eq!(s.repr(), "struct(a = 1, z = \"last\")");
    // `str` only unquotes the outermost string.
    assert_eq!(Value::list(vec![Value::string("x")], &m).to_str(), "[\"x\"]");
}

#[test]
fn self_referencing_list_renders_an_ellipsis() {
    let m = Mutability::new("test");
    let xs = Value::list(ints(&[1]), &m);
    let Value::List(list) = &xs else {
        unreachable!()
    };
    list.push(xs.clone(), &m).unwrap();
    assert_eq!(xs.repr(), "[1, [...]]");
}

#[test]
fn truthiness() {
    let m = Mutability::new("test");
    for falsy in [
        Value::None,
        Value::Bool(false),
        Value::int(0),
        Value::string(""),
        Value::tuple(Vec::new()),
        Value::list(Vec::new(), &m),
        Value::empty_dict(&m),
    ] {
        assert!(!falsy.truth(), "{falsy:?} should be false");
    }
    for truthy in [
        Value::int(-1),
        Value::string("0"),
        Value::tuple(vec![Value::None]),
        Value::structure(Vec::new()),
    ] {
        assert!(truthy.truth(), "{truthy:?} should be true");
    }
}

#[test]
fn hashability() {
    let m = Mutability::new("test");
    assert!(Value::string("k").is_hashable());
    assert!(Value::tuple(ints(&[1, 2])).is_hashable());
    assert!(!Value::list(Vec::new(), &m).is_hashable());
    assert!(!Value::tuple(vec![Value::list(Vec::new(), &m)]).is_hashable());
    assert!(!Value::structure(vec![(Name::from("d"), Value::empty_dict(&m))]).is_hashable());

    let err = HashKey::new(Value::empty_dict(&m)).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Unhashable);
    assert_eq!(err.message, "unhashable type: 'dict'");
}

#[test]
fn equality_is_structural_for_data() {
    let a = Mutability::new("a");
    let b = Mutability::new("b");
    assert_eq!(Value::list(ints(&[1]), &a), Value::list(ints(&[1]), &b));
    assert_eq!(
        dict_of(&[("x", 1), ("y", 2)], &a),
        dict_of(&[("y", 2), ("x", 1)], &b)
    );
    assert_ne!(dict_of(&[("x", 1)], &a), dict_of(&[("x", 2)], &a));
    assert_ne!(Value::list(Vec::new(), &a), Value::tuple(Vec::new()));
    assert_ne!(Value::int(1), Value::Bool(true));
}

#[test]
fn ordering() {
    let m = Mutability::new("test");
    assert_eq!(compare(&Value::int(1), &Value::int(2)).unwrap(), Ordering::Less);
    assert_eq!(
        compare(&Value::string("b"), &Value::string("ab")).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        compare(&Value::Bool(false), &Value::Bool(true)).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        compare(&Value::list(ints(&[1, 2]), &m), &Value::list(ints(&[1]), &m)).unwrap(),
        Ordering::Greater
    );
    assert_eq!(
        compare(&Value::tuple(ints(&[1, 3])), &Value::tuple(ints(&[2]))).unwrap(),
        Ordering::Less
    );

    let err = compare(&Value::list(Vec::new(), &m), &Value::tuple(Vec::new())).unwrap_err();
    assert_eq!(err.message, "Cannot compare list with tuple");
    let s = Value::structure(Vec::new());
    let err = compare(&s, &s).unwrap_err();
    assert_eq!(err.message, "Cannot compare structs");
}

#[test]
fn sort_values_reports_the_first_failure() {
    let mut values = vec![Value::int(2), Value::string("a"), Value::int(1)];
    let err = sort_values(&mut values).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Uncomparable);

    let mut values = ints(&[3, 1, 2]);
    sort_values(&mut values).unwrap();
    assert_eq!(values, ints(&[1, 2, 3]));
}

#[test]
fn lengths() {
    let m = Mutability::new("test");
    assert_eq!(Value::string("héllo").length().unwrap(), Some(5));
    assert_eq!(dict_of(&[("a", 1)], &m).length().unwrap(), Some(1));
    assert_eq!(Value::int(1).length().unwrap(), None);
}

#[test]
fn length_of_an_overly_deep_depset_is_an_error() {
    let mut current: Option<Heap<Depset>> = None;
    for i in 0..=i64::try_from(MAX_DEPTH).unwrap() {
        let mut builder = Depset::builder(Order::Stable);
        builder.add_direct(Value::int(i)).unwrap();
        if let Some(child) = current {
            builder.add_transitive(child).unwrap();
        }
        current = Some(Heap::new(builder.build()));
    }
    let err = Value::Depset(current.unwrap()).length().unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DepsetDepth);
}

#[test]
fn iteration() {
    let m = Mutability::new("test");
    let semantics = Semantics::default();
    assert_eq!(
        dict_of(&[("b", 1), ("a", 2)], &m).iterate(&semantics).unwrap(),
        vec![Value::string("b"), Value::string("a")]
    );
    let err = Value::string("abc").iterate(&semantics).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NotIterable);
}

#[test]
fn deep_immutability_follows_the_domain() {
    let m = Mutability::new("test");
    let inner = Value::list(ints(&[1]), &m);
    let outer = Value::tuple(vec![inner]);
    assert!(Value::tuple(ints(&[1])).is_deeply_immutable());
    assert!(!outer.is_deeply_immutable());
    m.freeze();
    assert!(outer.is_deeply_immutable());
}

#[test]
fn type_names() {
    let m = Mutability::new("test");
    let names: Vec<&str> = [
        Value::None,
        Value::Bool(true),
        Value::int(0),
        Value::string(""),
        Value::list(Vec::new(), &m),
        Value::tuple(Vec::new()),
        Value::empty_dict(&m),
        Value::structure(Vec::new()),
    ]
    .iter()
    .map(Value::type_name)
    .collect();
    assert_eq!(
        names,
        vec!["NoneType", "bool", "int", "string", "list", "tuple", "dict", "struct"]
    );
}

// ScalarInt

#[test]
fn scalar_int_floor_semantics() {
    let n = ScalarInt::new;
    assert_eq!(n(-7).checked_floor_div(n(2)), Some(n(-4)));
    assert_eq!(n(7).checked_floor_mod(n(-2)), Some(n(-1)));
    assert_eq!(n(1).checked_floor_div(n(0)), None);
    assert_eq!(n(1).checked_floor_mod(n(0)), None);
    assert_eq!(ScalarInt::MIN.checked_floor_div(n(-1)), None);
    assert_eq!(ScalarInt::MIN.checked_floor_mod(n(-1)), Some(ScalarInt::ZERO));
}

#[test]
fn scalar_int_shifts() {
    let n = ScalarInt::new;
    assert_eq!(n(1).checked_shl(62), Some(n(1 << 62)));
    assert_eq!(n(1).checked_shl(63), None);
    assert_eq!(n(-1).checked_shl(63), Some(ScalarInt::MIN));
    assert_eq!(n(3).checked_shl(64), None);
    assert_eq!(ScalarInt::ZERO.checked_shl(200), Some(ScalarInt::ZERO));
    assert_eq!(n(5).checked_shl(-1), None);
    assert_eq!(n(-9).checked_shr(70), Some(n(-1)));
    assert_eq!(n(9).checked_shr(70), Some(ScalarInt::ZERO));
    assert_eq!(n(-9).checked_shr(1), Some(n(-5)));
}

#[test]
fn scalar_int_bitwise() {
    let n = ScalarInt::new;
    assert_eq!(n(0b1100) & n(0b1010), n(0b1000));
    assert_eq!(n(0b1100) | n(0b1010), n(0b1110));
    assert_eq!(n(0b1100) ^ n(0b1010), n(0b0110));
    assert_eq!(!n(0), n(-1));
}

proptest! {
    #[test]
    fn floor_div_and_mod_reconstruct_the_dividend(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(b != 0);
        prop_assume!(!(a == i64::MIN && b == -1));
        let (x, y) = (ScalarInt::new(a), ScalarInt::new(b));
        let q = x.checked_floor_div(y).unwrap().raw();
        let r = x.checked_floor_mod(y).unwrap().raw();
        prop_assert_eq!(i128::from(q) * i128::from(b) + i128::from(r), i128::from(a));
        prop_assert!(r == 0 || (r < 0) == (b < 0));
    }

    #[test]
    fn shl_is_exact_or_none(v in -1_000_000i64..1_000_000, count in 0i64..70) {
        match ScalarInt::new(v).checked_shl(count) {
            Some(result) => {
                prop_assert_eq!(i128::from(result.raw()), i128::from(v) << count);
            }
            None => {
                let wide = i128::from(v) << count.min(100);
                prop_assert!(wide > i128::from(i64::MAX) || wide < i128::from(i64::MIN));
            }
        }
    }
}
