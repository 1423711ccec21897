//! Lark IR - syntax tree consumed by the evaluator
//!
//! This crate contains the data structures handed to `lark_eval` by a parser
//! and scope resolver living outside this workspace:
//! - `Location` for source positions
//! - `Name` for shared identifier text
//! - Statement and expression nodes (`Stmt`, `Expr`) with resolved scopes
//! - `build`, terse constructors for assembling trees by hand
//!
//! Trees are plain owned data. Function bodies are held behind `Arc` so that
//! function values created at run time can share them without copying.

pub mod ast;
pub mod build;
mod location;
mod name;

pub use ast::{
    Argument, BinaryOp, CallExpr, Clause, Comprehension, ComprehensionBody, DefStatement, Expr,
    ExprKind, File, FlowKind, Identifier, LoadBinding, LoadStatement, Parameter, Scope, Stmt,
    StmtKind, UnaryOp,
};
pub use location::Location;
pub use name::Name;
