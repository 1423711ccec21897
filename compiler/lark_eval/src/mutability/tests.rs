#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::errors::EvalErrorKind;
use pretty_assertions::assert_eq;

fn site(line: u32) -> Location {
    Location::new("t.lark", line, 1)
}

#[test]
fn unfrozen_unlocked_object_is_mutable() {
    let domain = Mutability::new("test");
    assert!(domain.check_mutable(ObjectId::fresh(), &domain).is_ok());
}

#[test]
fn frozen_domain_rejects_mutation() {
    let domain = Mutability::new("test");
    domain.freeze();
    let err = domain
        .check_mutable(ObjectId::fresh(), &domain)
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::FrozenObject);
    assert_eq!(err.message, "trying to mutate a frozen object");
}

#[test]
fn frozen_object_may_be_checked_from_any_domain() {
    let owner = Mutability::new("owner");
    owner.freeze();
    let other = Mutability::new("other");
    let err = owner.check_mutable(ObjectId::fresh(), &other).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::FrozenObject);
}

#[test]
#[should_panic(expected = "trying to mutate an object from a different context")]
fn foreign_domain_mutation_panics() {
    let owner = Mutability::new("owner");
    let other = Mutability::new("other");
    let _ = owner.check_mutable(ObjectId::fresh(), &other);
}

#[test]
fn lock_is_released_on_drop() {
    let domain = Mutability::new("test");
    let object = ObjectId::fresh();
    {
        let _guard = domain.lock(object, site(3));
        let err = domain.check_mutable(object, &domain).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::LockedObject);
        assert!(err.message.contains("t.lark:3:1"));
    }
    assert!(!domain.is_locked(object));
    assert!(domain.check_mutable(object, &domain).is_ok());
}

#[test]
fn nested_locks_form_a_multiset() {
    let domain = Mutability::new("test");
    let object = ObjectId::fresh();
    let outer = domain.lock(object, site(1));
    let inner = domain.lock(object, site(1));
    drop(inner);
    assert!(domain.is_locked(object));
    drop(outer);
    assert!(!domain.is_locked(object));
}

#[test]
fn locks_only_affect_their_object() {
    let domain = Mutability::new("test");
    let locked = ObjectId::fresh();
    let _guard = domain.lock(locked, site(1));
    assert!(domain.check_mutable(ObjectId::fresh(), &domain).is_ok());
}

#[test]
fn freezing_is_terminal_and_clears_locks() {
    let domain = Mutability::new("test");
    let object = ObjectId::fresh();
    let guard = domain.lock(object, site(1));
    domain.freeze();
    domain.freeze();
    assert!(domain.is_frozen());
    assert!(!domain.is_locked(object));
    drop(guard);
    assert!(domain.is_frozen());
}

#[test]
fn immutable_domain_is_shared_and_frozen() {
    let a = Mutability::immutable();
    let b = Mutability::immutable();
    assert!(a.is_frozen());
    assert!(a.same_domain(&b));
}
