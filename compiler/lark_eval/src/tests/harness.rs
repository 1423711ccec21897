#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use lark_ir::build::{call, file, ident, pos};
use lark_ir::{Expr, Stmt};

use crate::errors::{EvalAbort, EvalError, EvalResult};
use crate::interpreter::{eval_expression, exec_file, Module, Thread};
use crate::mutability::Mutability;
use crate::print_handler::{buffer_handler, SharedPrintHandler};
use crate::semantics::Semantics;
use crate::value::Value;

/// A thread, one module and a print buffer.
pub(crate) struct Harness {
    pub(crate) thread: Thread,
    pub(crate) module: Arc<Module>,
    pub(crate) output: SharedPrintHandler,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Harness::with_semantics(Semantics::default())
    }

    pub(crate) fn with_semantics(semantics: Semantics) -> Self {
        let output = buffer_handler();
        let thread = Thread::builder("test")
            .semantics(semantics)
            .print_handler(Arc::clone(&output))
            .build();
        let module = thread.new_module("test");
        Harness {
            thread,
            module,
            output,
        }
    }

    pub(crate) fn exec(&mut self, statements: Vec<Stmt>) -> EvalResult<()> {
        exec_file(&mut self.thread, &self.module, &file("test.lark", statements))
    }

    pub(crate) fn run(&mut self, statements: Vec<Stmt>) {
        if let Err(err) = self.exec(statements) {
            panic!("evaluation failed: {}", render(&err));
        }
    }

    pub(crate) fn try_eval(&mut self, expr: &Expr) -> EvalResult {
        eval_expression(&mut self.thread, &self.module, expr)
    }

    pub(crate) fn eval(&mut self, expr: Expr) -> Value {
        self.try_eval(&expr)
            .unwrap_or_else(|err| panic!("evaluation failed: {}", render(&err)))
    }

    pub(crate) fn eval_err(&mut self, expr: Expr) -> EvalError {
        expect_error(self.try_eval(&expr))
    }

    pub(crate) fn exec_err(&mut self, statements: Vec<Stmt>) -> EvalError {
        expect_error(self.exec(statements))
    }

    pub(crate) fn global(&self, name: &str) -> Value {
        self.module
            .get(name)
            .unwrap_or_else(|| panic!("global '{name}' is not bound"))
    }

    pub(crate) fn output(&self) -> String {
        self.output.output()
    }
}

fn render(err: &EvalAbort) -> String {
    match err {
        EvalAbort::Error(err) => err.render(),
        EvalAbort::Cancelled => "cancelled".to_string(),
    }
}

pub(crate) fn expect_error<T: std::fmt::Debug>(result: EvalResult<T>) -> EvalError {
    match result {
        Ok(value) => panic!("expected an error, got {value:?}"),
        Err(EvalAbort::Error(err)) => *err,
        Err(EvalAbort::Cancelled) => panic!("expected an error, got a cancellation"),
    }
}

/// `name(arg, ...)` with positional arguments only.
pub(crate) fn call_global(name: &str, args: Vec<Expr>) -> Expr {
    call(ident(name), args.into_iter().map(pos).collect())
}

pub(crate) fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::int).collect()
}

/// A list for comparisons; list equality ignores the domain.
pub(crate) fn list_of(items: Vec<Value>) -> Value {
    Value::list(items, &Mutability::immutable())
}

pub(crate) fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::string).collect()
}
