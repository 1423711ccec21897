#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn loc(line: u32) -> Location {
    Location::new("pkg/defs.lark", line, 5)
}

#[test]
fn first_location_wins() {
    let err = division_by_zero()
        .with_location(&loc(3))
        .with_location(&loc(9));
    assert_eq!(err.location, Some(loc(3)));
}

#[test]
fn frames_accumulate_innermost_first() {
    let err = fail("boom")
        .with_location(&loc(1))
        .with_frame(Name::from("g"), loc(4))
        .with_frame(Name::from("f"), loc(8));
    let names: Vec<&str> = err.stack.iter().map(|f| f.function.as_str()).collect();
    assert_eq!(names, vec!["g", "f"]);
}

#[test]
fn render_lists_outermost_call_first() {
    let err = fail("boom")
        .with_location(&loc(1))
        .with_frame(Name::from("g"), loc(4))
        .with_frame(Name::from("f"), loc(8));
    assert_eq!(
        err.render(),
        "Traceback (most recent call last):\n\
         \tpkg/defs.lark:8:5: in call to f\n\
         \tpkg/defs.lark:4:5: in call to g\n\
         Error at pkg/defs.lark:1:5: boom"
    );
}

#[test]
fn render_without_stack_or_location() {
    assert_eq!(integer_overflow().render(), "Error: integer overflow");
}

#[test]
fn cancellation_ignores_locations() {
    let abort = EvalAbort::Cancelled.at(&loc(2));
    assert!(abort.is_cancelled());
    assert!(abort.as_error().is_none());
}

#[test]
fn abort_display_is_message() {
    let abort: EvalAbort = not_callable("int").into();
    assert_eq!(abort.to_string(), "'int' object is not callable");
}

#[test]
fn name_lists_are_quoted_and_pluralized() {
    let one = passed_both(&[Name::from("a")], "f(a, b)");
    assert_eq!(
        one.message,
        "argument 'a' passed both by position and by name in call to f(a, b)"
    );
    let two = unexpected_keywords(&[Name::from("x"), Name::from("y")], "f()");
    assert_eq!(two.message, "unexpected keywords 'x', 'y' in call to f()");
}

#[test]
fn suggestions_are_appended() {
    assert_eq!(
        undefined_name("lenn", Some("len")).message,
        "name 'lenn' is not defined (did you mean 'len'?)"
    );
    assert_eq!(
        missing_attribute("list", "apend", Some("append")).message,
        "object of type 'list' has no field or method 'apend' (did you mean 'append'?)"
    );
}

#[test]
fn locked_message_lists_locations() {
    let err = locked_object(&[loc(2), loc(6)]);
    assert_eq!(err.kind, EvalErrorKind::LockedObject);
    assert!(err
        .message
        .ends_with("Object locked at the following location(s): pkg/defs.lark:2:5, pkg/defs.lark:6:5"));
}
