//! The evaluation context.

use std::sync::Arc;

use lark_ir::Name;
use rustc_hash::FxHashMap;
use tracing::debug;

use super::{CancellationToken, Debugger, Module, ThreadBuilder};
use crate::dispatch::{DispatchCache, DispatchTable};
use crate::errors::{internal, EvalAbort, EvalError};
use crate::mutability::Mutability;
use crate::print_handler::SharedPrintHandler;
use crate::semantics::Semantics;
use crate::value::{BuiltinFunction, TypeTag, Value};

/// Call depth at which evaluation stops with an error.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// A user function currently executing.
struct ActiveCall {
    function: usize,
    name: Name,
}

/// State of one evaluation: its mutability domain, semantics, output,
/// loadable modules and call stack.
///
/// Everything a thread creates belongs to its domain, which is frozen when
/// the thread is dropped.
pub struct Thread {
    mutability: Mutability,
    semantics: Semantics,
    print_handler: SharedPrintHandler,
    dispatch: Arc<DispatchCache>,
    cancellation: CancellationToken,
    debugger: Option<Box<dyn Debugger>>,
    modules: FxHashMap<Arc<str>, Arc<Module>>,
    max_call_depth: usize,
    call_stack: Vec<ActiveCall>,
}

impl Thread {
    /// Start configuring a thread whose domain is labelled `label`.
    pub fn builder(label: impl Into<String>) -> ThreadBuilder {
        ThreadBuilder::new(label)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn from_parts(
        mutability: Mutability,
        semantics: Semantics,
        print_handler: SharedPrintHandler,
        dispatch: Arc<DispatchCache>,
        cancellation: CancellationToken,
        debugger: Option<Box<dyn Debugger>>,
        modules: FxHashMap<Arc<str>, Arc<Module>>,
        max_call_depth: usize,
    ) -> Self {
        Thread {
            mutability,
            semantics,
            print_handler,
            dispatch,
            cancellation,
            debugger,
            modules,
            max_call_depth,
            call_stack: Vec::new(),
        }
    }

    pub fn mutability(&self) -> &Mutability {
        &self.mutability
    }

    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn dispatch(&self) -> &Arc<DispatchCache> {
        &self.dispatch
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Number of user functions currently executing.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Make `module` available to `load` statements under `name`.
    pub fn add_module(&mut self, name: impl Into<Arc<str>>, module: Arc<Module>) {
        self.modules.insert(name.into(), module);
    }

    pub fn module(&self, name: &str) -> Option<&Arc<Module>> {
        self.modules.get(name)
    }

    /// A fresh module owned by this thread's domain.
    pub fn new_module(&self, name: impl Into<Arc<str>>) -> Arc<Module> {
        Module::new(name, self.mutability.clone())
    }

    /// Install `debugger`, closing the one it replaces.
    pub fn set_debugger(&mut self, debugger: Option<Box<dyn Debugger>>) {
        if let Some(mut previous) = std::mem::replace(&mut self.debugger, debugger) {
            debug!("replacing debugger");
            previous.close();
        }
    }

    /// Run `f` with `debugger` installed, then close it and restore the
    /// debugger that was installed before.
    pub fn with_debugger<R>(
        &mut self,
        debugger: Box<dyn Debugger>,
        f: impl FnOnce(&mut Thread) -> R,
    ) -> R {
        let saved = self.debugger.replace(debugger);
        let result = f(self);
        if let Some(mut pushed) = std::mem::replace(&mut self.debugger, saved) {
            pushed.close();
        }
        result
    }

    pub(crate) fn debugger_mut(&mut self) -> Option<&mut (dyn Debugger + 'static)> {
        self.debugger.as_deref_mut()
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), EvalAbort> {
        if self.cancellation.is_cancelled() {
            Err(EvalAbort::Cancelled)
        } else {
            Ok(())
        }
    }

    /// The dispatch table of `tag` under this thread's semantics.
    pub fn table(&self, tag: TypeTag) -> Result<Arc<DispatchTable>, EvalError> {
        self.dispatch
            .table(tag, &self.semantics)
            .map_err(|err| internal(err.to_string()))
    }

    /// A global builtin or universe constant.
    pub fn universe(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(match name {
            "None" => Some(Value::None),
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            _ => self
                .table(TypeTag::Universe)?
                .get(name)
                .map(|d| Value::builtin(BuiltinFunction::new(None, TypeTag::Universe, d))),
        })
    }

    /// Names of the universe, sorted.
    pub fn universe_names(&self) -> Result<Vec<&'static str>, EvalError> {
        let mut names = self.table(TypeTag::Universe)?.names();
        names.extend(["False", "None", "True"]);
        names.sort_unstable();
        Ok(names)
    }

    /// Name of the innermost user function, or `<toplevel>`.
    pub(crate) fn caller_name(&self) -> &str {
        self.call_stack
            .last()
            .map_or("<toplevel>", |call| call.name.as_str())
    }

    pub(crate) fn is_active(&self, function: usize) -> bool {
        self.call_stack.iter().any(|call| call.function == function)
    }

    pub(crate) fn push_call(&mut self, function: usize, name: Name) {
        self.call_stack.push(ActiveCall { function, name });
    }

    pub(crate) fn pop_call(&mut self) {
        self.call_stack.pop();
    }

    /// Freeze this thread's domain. Dropping the thread does the same.
    pub fn freeze(&self) {
        self.mutability.freeze();
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        self.set_debugger(None);
        self.mutability.freeze();
    }
}
