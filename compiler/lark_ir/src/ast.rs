//! Statement and expression nodes.
//!
//! The tree arrives already validated: scopes of identifiers are resolved,
//! `break`/`continue` only appear inside loops, `return` only inside function
//! bodies, and `*`/`**` call arguments only appear last.

use std::fmt;
use std::sync::Arc;

use crate::{Location, Name};

/// Lexical scope class assigned to an identifier by the resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Bound in the current function activation.
    Local,
    /// Bound in the module's global table.
    Module,
    /// Predeclared by the host (`len`, `True`, ...).
    Universe,
}

/// An identifier occurrence.
///
/// `scope` is `None` when the resolver left the identifier unresolved; the
/// evaluator then searches locals, globals and the universe in that order.
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: Name,
    pub scope: Option<Scope>,
}

impl Identifier {
    pub fn new(name: impl Into<Name>) -> Self {
        Identifier {
            name: name.into(),
            scope: None,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    FloorDivide,
    Percent,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    In,
    NotIn,
    And,
    Or,
    Pipe,
    Ampersand,
    Caret,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    /// The operator as written in source.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Percent => "%",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Pipe => "|",
            BinaryOp::Ampersand => "&",
            BinaryOp::Caret => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    Tilde,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Tilde => "~",
        }
    }
}

/// An expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Expr { kind, location }
    }

    /// Replace the location of this node.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Ident(Identifier),
    Int(i64),
    Str(Arc<str>),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `then if cond else otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `object.field`
    Dot {
        object: Box<Expr>,
        field: Name,
    },
    /// `object[key]`
    Index {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    /// `object[start:end:step]`, each bound optional.
    Slice {
        object: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Call(Box<CallExpr>),
    Comprehension(Box<Comprehension>),
}

/// A call site: callee expression and its arguments in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub function: Expr,
    pub args: Vec<Argument>,
}

/// One argument at a call site.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    /// `f(x)`
    Positional(Expr),
    /// `f(name = x)`
    Keyword(Name, Expr),
    /// `f(*x)`
    Star(Expr),
    /// `f(**x)`
    StarStar(Expr),
}

/// `[body for ... if ...]` or `{key: value for ... if ...}`.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub body: ComprehensionBody,
    pub clauses: Vec<Clause>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComprehensionBody {
    List(Expr),
    Dict { key: Expr, value: Expr },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    For { target: Expr, iterable: Expr },
    If(Expr),
}

/// A statement with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Stmt { kind, location }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `lhs = rhs`; `lhs` is an identifier, index expression, or a list or
    /// tuple of targets.
    Assign { lhs: Expr, rhs: Expr },
    /// `lhs op= rhs`
    AugAssign { lhs: Expr, op: BinaryOp, rhs: Expr },
    Expr(Expr),
    Flow(FlowKind),
    For {
        target: Expr,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Def(Arc<DefStatement>),
    If {
        cond: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    Load(LoadStatement),
    Return(Option<Expr>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowKind {
    Break,
    Continue,
    Pass,
}

/// `def name(params): body`
#[derive(Clone, Debug, PartialEq)]
pub struct DefStatement {
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub body: Vec<Stmt>,
    pub location: Location,
}

/// A declared parameter, in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum Parameter {
    /// `x`
    Mandatory(Name),
    /// `x = default`
    Optional(Name, Expr),
    /// `*args`, or a bare `*` separating named-only parameters.
    Star(Option<Name>),
    /// `**kwargs`
    StarStar(Name),
}

impl Parameter {
    pub fn name(&self) -> Option<&Name> {
        match self {
            Parameter::Mandatory(name)
            | Parameter::Optional(name, _)
            | Parameter::StarStar(name) => Some(name),
            Parameter::Star(name) => name.as_ref(),
        }
    }
}

/// `load("module", "sym", alias = "other")`
#[derive(Clone, Debug, PartialEq)]
pub struct LoadStatement {
    pub module: Arc<str>,
    pub bindings: Vec<LoadBinding>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadBinding {
    /// Name bound in the loading module.
    pub local: Identifier,
    /// Name exported by the loaded module.
    pub original: Name,
}

/// A parsed file: its path and top-level statements.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    pub path: Arc<str>,
    pub statements: Vec<Stmt>,
}

#[cfg(test)]
mod tests;
