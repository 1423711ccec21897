#![deny(clippy::arithmetic_side_effects)]
//! Lark Eval - runtime values and tree-walking evaluator for lark.
//!
//! This crate executes syntax trees produced by `lark_ir`:
//! - [`Value`]: closed sum type of runtime values, with lists and dicts
//!   stamped by a [`Mutability`] domain that can be frozen
//! - [`FunctionSignature`] and the two argument binders
//!   ([`bind_signature`] for script functions, [`bind_descriptor`] for host
//!   methods)
//! - [`DispatchCache`]: per-type, per-[`Semantics`] method tables built once
//!   from static [`MethodDescriptor`]s
//! - [`Depset`]: immutable, order-tagged hierarchical sets
//! - [`Thread`] and the entry points [`exec_file`], [`eval_expression`] and
//!   [`call_function`]
//!
//! # Example
//!
//! ```text
//! use lark_ir::build::*;
//! let mut thread = Thread::builder("main").build();
//! let module = thread.new_module("main");
//! let value = eval_expression(&mut thread, &module, &binary(int(7), BinaryOp::FloorDivide, int(-2)))?;
//! assert_eq!(value, Value::int(-4));
//! ```

pub mod binder;
mod builtins;
pub mod depset;
pub mod dispatch;
pub mod errors;
pub mod interpreter;
pub mod mutability;
pub mod print_handler;
pub mod semantics;
pub mod signature;
mod suggest;
pub mod value;

use std::sync::Once;

pub use binder::{bind_descriptor, bind_signature, NamedArgs};
pub use depset::{Depset, DepsetBuilder, Order};
pub use dispatch::{
    DispatchCache, DispatchError, DispatchTable, Invocation, MethodDescriptor, MethodRegistry,
};
pub use errors::{EvalAbort, EvalError, EvalErrorKind, EvalResult, StackFrame};
pub use interpreter::{
    call_function, eval_expression, exec_file, CancellationToken, Debugger, FrameView, Module,
    Thread, ThreadBuilder,
};
pub use mutability::Mutability;
pub use print_handler::{PrintBuffer, PrintEvent, PrintHandler, SharedPrintHandler};
pub use semantics::{flags, Semantics};
pub use signature::{FunctionSignature, SignatureError};
pub use value::{TypeTag, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=lark_eval=debug` or
/// `RUST_LOG=lark_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
