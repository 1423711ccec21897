//! Statement-level debugging hooks.

use lark_ir::{Location, Name};
use rustc_hash::FxHashMap;

use super::Module;
use crate::value::Value;

/// A hook run before every statement.
///
/// Any `FnMut(&FrameView)` closure is a debugger.
pub trait Debugger: Send {
    fn before_statement(&mut self, frame: &FrameView<'_>);

    /// Called once when the debugger is replaced or removed.
    fn close(&mut self) {}
}

impl<F> Debugger for F
where
    F: FnMut(&FrameView<'_>) + Send,
{
    fn before_statement(&mut self, frame: &FrameView<'_>) {
        self(frame);
    }
}

/// Read-only view of the frame about to execute a statement.
pub struct FrameView<'a> {
    pub(crate) location: &'a Location,
    pub(crate) function: Option<&'a Name>,
    pub(crate) locals: &'a FxHashMap<Name, Value>,
    pub(crate) module: &'a Module,
    pub(crate) call_depth: usize,
}

impl FrameView<'_> {
    pub fn location(&self) -> &Location {
        self.location
    }

    /// The running function, or `None` at the top level of a file.
    pub fn function(&self) -> Option<&Name> {
        self.function
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }

    /// Local bindings, sorted by name.
    pub fn locals(&self) -> Vec<(&Name, &Value)> {
        let mut locals: Vec<_> = self.locals.iter().collect();
        locals.sort_by(|a, b| a.0.cmp(b.0));
        locals
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.module.get(name)
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    /// Number of user functions active on the thread.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }
}
