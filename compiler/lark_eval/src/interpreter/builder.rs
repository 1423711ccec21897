//! `ThreadBuilder` for configuring evaluation threads.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::thread::DEFAULT_MAX_CALL_DEPTH;
use super::{CancellationToken, Debugger, Module, Thread};
use crate::dispatch::DispatchCache;
use crate::mutability::Mutability;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::semantics::Semantics;

/// Builder for [`Thread`].
///
/// Every setting has a default: empty semantics, stdout printing, the
/// process-wide dispatch cache, a fresh cancellation token, no debugger, no
/// loadable modules, and a call depth limit of 1000.
pub struct ThreadBuilder {
    label: String,
    semantics: Semantics,
    print_handler: Option<SharedPrintHandler>,
    dispatch: Option<Arc<DispatchCache>>,
    cancellation: CancellationToken,
    debugger: Option<Box<dyn Debugger>>,
    modules: FxHashMap<Arc<str>, Arc<Module>>,
    max_call_depth: usize,
}

impl ThreadBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        ThreadBuilder {
            label: label.into(),
            semantics: Semantics::default(),
            print_handler: None,
            dispatch: None,
            cancellation: CancellationToken::new(),
            debugger: None,
            modules: FxHashMap::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    #[must_use]
    pub fn semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Use a private dispatch cache instead of the shared one.
    #[must_use]
    pub fn dispatch(mut self, cache: Arc<DispatchCache>) -> Self {
        self.dispatch = Some(cache);
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    #[must_use]
    pub fn debugger(mut self, debugger: Box<dyn Debugger>) -> Self {
        self.debugger = Some(debugger);
        self
    }

    /// Make a (frozen) module loadable as `name`.
    #[must_use]
    pub fn module(mut self, name: impl Into<Arc<str>>, module: Arc<Module>) -> Self {
        self.modules.insert(name.into(), module);
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Thread {
        Thread::from_parts(
            Mutability::new(self.label),
            self.semantics,
            self.print_handler.unwrap_or_else(stdout_handler),
            self.dispatch.unwrap_or_else(DispatchCache::shared),
            self.cancellation,
            self.debugger,
            self.modules,
            self.max_call_depth,
        )
    }
}
