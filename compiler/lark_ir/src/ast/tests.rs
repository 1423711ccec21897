#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn operator_symbols() {
    assert_eq!(BinaryOp::FloorDivide.as_symbol(), "//");
    assert_eq!(BinaryOp::NotIn.to_string(), "not in");
    assert_eq!(UnaryOp::Tilde.as_symbol(), "~");
}

#[test]
fn parameter_names() {
    let loc = Location::new("t", 1, 1);
    let params = [
        Parameter::Mandatory(Name::from("a")),
        Parameter::Optional(Name::from("b"), Expr::new(ExprKind::Int(1), loc)),
        Parameter::Star(None),
        Parameter::StarStar(Name::from("kw")),
    ];
    let names: Vec<Option<&str>> = params.iter().map(|p| p.name().map(Name::as_str)).collect();
    assert_eq!(names, vec![Some("a"), Some("b"), None, Some("kw")]);
}

#[test]
fn identifier_scope() {
    let id = Identifier::new("x");
    assert_eq!(id.scope, None);
    assert_eq!(id.with_scope(Scope::Local).scope, Some(Scope::Local));
}
