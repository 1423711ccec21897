//! Terse constructors for syntax trees.
//!
//! Hosts without a parser, and tests, assemble trees with these helpers.
//! Every node gets the location `<input>:1:1`; use `Expr::at`/`Stmt::at`
//! (or [`line`]) to place a node elsewhere.
//!
//! ```text
//! use lark_ir::build::*;
//! let f = def("f", vec![param("a"), optional("b", int(2))],
//!             vec![ret(tuple(vec![ident("a"), ident("b")]))]);
//! ```

use std::sync::Arc;

use crate::ast::{
    Argument, BinaryOp, CallExpr, Clause, Comprehension, ComprehensionBody, DefStatement, Expr,
    ExprKind, File, FlowKind, Identifier, LoadBinding, LoadStatement, Parameter, Scope, Stmt,
    StmtKind, UnaryOp,
};
use crate::{Location, Name};

const INPUT: &str = "<input>";

/// Location on the given line of the default input file.
pub fn line(line: u32) -> Location {
    Location::new(INPUT, line, 1)
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, line(1))
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, line(1))
}

// Expressions

/// Unresolved identifier.
pub fn ident(name: &str) -> Expr {
    expr(ExprKind::Ident(Identifier::new(name)))
}

/// Identifier resolved to the given scope.
pub fn scoped(name: &str, scope: Scope) -> Expr {
    expr(ExprKind::Ident(Identifier::new(name).with_scope(scope)))
}

pub fn int(value: i64) -> Expr {
    expr(ExprKind::Int(value))
}

pub fn string(value: &str) -> Expr {
    expr(ExprKind::Str(Arc::from(value)))
}

pub fn list(items: Vec<Expr>) -> Expr {
    expr(ExprKind::List(items))
}

pub fn tuple(items: Vec<Expr>) -> Expr {
    expr(ExprKind::Tuple(items))
}

pub fn dict(entries: Vec<(Expr, Expr)>) -> Expr {
    expr(ExprKind::Dict(entries))
}

pub fn binary(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

/// `then if cond else otherwise`
pub fn conditional(then: Expr, cond: Expr, otherwise: Expr) -> Expr {
    expr(ExprKind::Conditional {
        cond: Box::new(cond),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

pub fn dot(object: Expr, field: &str) -> Expr {
    expr(ExprKind::Dot {
        object: Box::new(object),
        field: Name::from(field),
    })
}

pub fn index(object: Expr, key: Expr) -> Expr {
    expr(ExprKind::Index {
        object: Box::new(object),
        key: Box::new(key),
    })
}

pub fn slice(object: Expr, start: Option<Expr>, end: Option<Expr>, step: Option<Expr>) -> Expr {
    expr(ExprKind::Slice {
        object: Box::new(object),
        start: start.map(Box::new),
        end: end.map(Box::new),
        step: step.map(Box::new),
    })
}

pub fn call(function: Expr, args: Vec<Argument>) -> Expr {
    expr(ExprKind::Call(Box::new(CallExpr { function, args })))
}

/// `receiver.method(args)`
pub fn method(receiver: Expr, name: &str, args: Vec<Argument>) -> Expr {
    call(dot(receiver, name), args)
}

pub fn pos(value: Expr) -> Argument {
    Argument::Positional(value)
}

pub fn kw(name: &str, value: Expr) -> Argument {
    Argument::Keyword(Name::from(name), value)
}

pub fn star(value: Expr) -> Argument {
    Argument::Star(value)
}

pub fn star_star(value: Expr) -> Argument {
    Argument::StarStar(value)
}

pub fn list_comp(body: Expr, clauses: Vec<Clause>) -> Expr {
    expr(ExprKind::Comprehension(Box::new(Comprehension {
        body: ComprehensionBody::List(body),
        clauses,
    })))
}

pub fn dict_comp(key: Expr, value: Expr, clauses: Vec<Clause>) -> Expr {
    expr(ExprKind::Comprehension(Box::new(Comprehension {
        body: ComprehensionBody::Dict { key, value },
        clauses,
    })))
}

pub fn for_clause(target: Expr, iterable: Expr) -> Clause {
    Clause::For { target, iterable }
}

pub fn if_clause(cond: Expr) -> Clause {
    Clause::If(cond)
}

// Statements

pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
    stmt(StmtKind::Assign { lhs, rhs })
}

pub fn aug_assign(lhs: Expr, op: BinaryOp, rhs: Expr) -> Stmt {
    stmt(StmtKind::AugAssign { lhs, op, rhs })
}

pub fn expr_stmt(value: Expr) -> Stmt {
    stmt(StmtKind::Expr(value))
}

pub fn pass() -> Stmt {
    stmt(StmtKind::Flow(FlowKind::Pass))
}

pub fn break_() -> Stmt {
    stmt(StmtKind::Flow(FlowKind::Break))
}

pub fn continue_() -> Stmt {
    stmt(StmtKind::Flow(FlowKind::Continue))
}

pub fn for_(target: Expr, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::For {
        target,
        iterable,
        body,
    })
}

pub fn if_(cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then,
        otherwise,
    })
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub fn ret_none() -> Stmt {
    stmt(StmtKind::Return(None))
}

pub fn def(name: &str, params: Vec<Parameter>, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Def(Arc::new(DefStatement {
        name: Identifier::new(name),
        params,
        body,
        location: line(1),
    })))
}

/// `load(module, local = "original", ...)`
pub fn load(module: &str, bindings: &[(&str, &str)]) -> Stmt {
    stmt(StmtKind::Load(LoadStatement {
        module: Arc::from(module),
        bindings: bindings
            .iter()
            .map(|(local, original)| LoadBinding {
                local: Identifier::new(*local),
                original: Name::from(*original),
            })
            .collect(),
    }))
}

// Parameters

pub fn param(name: &str) -> Parameter {
    Parameter::Mandatory(Name::from(name))
}

pub fn optional(name: &str, default: Expr) -> Parameter {
    Parameter::Optional(Name::from(name), default)
}

/// `*args`
pub fn star_param(name: &str) -> Parameter {
    Parameter::Star(Some(Name::from(name)))
}

/// Bare `*`.
pub fn bare_star() -> Parameter {
    Parameter::Star(None)
}

pub fn kwargs_param(name: &str) -> Parameter {
    Parameter::StarStar(Name::from(name))
}

pub fn file(path: &str, statements: Vec<Stmt>) -> File {
    File {
        path: Arc::from(path),
        statements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn method_call_shape() {
        let e = method(ident("xs"), "append", vec![pos(int(1))]);
        let ExprKind::Call(call) = &e.kind else {
            panic!("expected call, got {e:?}");
        };
        assert_eq!(call.args, vec![Argument::Positional(int(1))]);
        assert!(matches!(&call.function.kind, ExprKind::Dot { field, .. } if &**field == "append"));
    }

    #[test]
    fn relocating_nodes() {
        let s = pass().at(line(9));
        assert_eq!(s.location.line, 9);
        assert_eq!(&*s.location.file, "<input>");
    }

    #[test]
    fn load_bindings_keep_order() {
        let s = load("//lib:defs", &[("x", "x"), ("y", "z")]);
        let StmtKind::Load(load) = s.kind else {
            panic!("expected load");
        };
        let pairs: Vec<(String, String)> = load
            .bindings
            .iter()
            .map(|b| (b.local.name.to_string(), b.original.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![("x".into(), "x".into()), ("y".into(), "z".into())]
        );
    }
}
