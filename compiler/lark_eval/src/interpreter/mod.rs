//! Tree-walking evaluation of statements and expressions.
//!
//! An [`Interpreter`] executes one frame: the top level of a file or one
//! call of a user function. Everything that outlives a frame (domain,
//! semantics, call stack, debugger) lives on the [`Thread`] it borrows.
//!
//! Hosts use the entry points below; they never build an interpreter
//! themselves.

mod assign;
mod builder;
mod call;
mod cancel;
mod comprehension;
mod debugger;
mod expr;
mod index;
mod module;
mod operators;
mod stmt;
mod thread;

use std::sync::Arc;

use lark_ir::{DefStatement, Expr, File, Identifier, Location, Name, Stmt, StmtKind};
use rustc_hash::FxHashMap;
use tracing::instrument;

pub use builder::ThreadBuilder;
pub use cancel::CancellationToken;
pub use debugger::{Debugger, FrameView};
pub use module::Module;
pub use thread::{Thread, DEFAULT_MAX_CALL_DEPTH};

pub(crate) use call::call_value;
pub(crate) use expr::{attribute_names, get_attribute, has_attribute};
pub(crate) use index::normalize_index;

use crate::binder::NamedArgs;
use crate::errors::EvalResult;
use crate::signature::FunctionSignature;
use crate::value::{Heap, UserFunction, Value};

/// One executing frame.
pub(crate) struct Interpreter<'t> {
    thread: &'t mut Thread,
    module: Arc<Module>,
    locals: FxHashMap<Name, Value>,
    /// At the top level of a file, unresolved names bind as globals.
    toplevel: bool,
    function: Option<Name>,
}

impl<'t> Interpreter<'t> {
    fn toplevel(thread: &'t mut Thread, module: Arc<Module>) -> Self {
        Interpreter {
            thread,
            module,
            locals: FxHashMap::default(),
            toplevel: true,
            function: None,
        }
    }

    fn for_call(
        thread: &'t mut Thread,
        module: Arc<Module>,
        function: Name,
        locals: FxHashMap<Name, Value>,
    ) -> Self {
        Interpreter {
            thread,
            module,
            locals,
            toplevel: false,
            function: Some(function),
        }
    }
}

/// Execute every statement of `file` in `module`.
#[instrument(level = "debug", skip_all, fields(file = %file.path, module = module.name()))]
pub fn exec_file(thread: &mut Thread, module: &Arc<Module>, file: &File) -> EvalResult<()> {
    let mut interp = Interpreter::toplevel(thread, Arc::clone(module));
    interp.exec_block(&file.statements)?;
    Ok(())
}

/// Evaluate `expr` as the body of an anonymous function defined in
/// `module`.
#[instrument(level = "debug", skip_all)]
pub fn eval_expression(thread: &mut Thread, module: &Arc<Module>, expr: &Expr) -> EvalResult {
    let location = expr.location.clone();
    let def = Arc::new(DefStatement {
        name: Identifier::new("<expr>"),
        params: Vec::new(),
        body: vec![Stmt::new(StmtKind::Return(Some(expr.clone())), location.clone())],
        location: location.clone(),
    });
    let function = UserFunction::new(
        Name::from("<expr>"),
        FunctionSignature::default(),
        Vec::new(),
        def,
        Arc::clone(module),
    );
    call::call_user(
        thread,
        &Heap::new(function),
        Vec::new(),
        Vec::new(),
        &location,
    )
}

/// Call a script or host callable from host code.
pub fn call_function(
    thread: &mut Thread,
    callee: &Value,
    positional: Vec<Value>,
    named: NamedArgs,
    location: &Location,
) -> EvalResult {
    call_value(thread, callee, positional, named, location, None)
}

#[cfg(test)]
mod tests;
