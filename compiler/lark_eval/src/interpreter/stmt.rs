//! Statement execution.

use lark_ir::{FlowKind, LoadStatement, Parameter, Stmt, StmtKind};

use super::{FrameView, Interpreter};
use crate::errors::{invalid_signature, unfrozen_module, unknown_module, unknown_symbol, EvalResult};
use crate::signature::FunctionSignature;
use crate::suggest::suggest;
use crate::value::{UserFunction, Value};

/// How a statement finished.
pub(crate) enum Control {
    Pass,
    Break,
    Continue,
    Return(Value),
}

impl Interpreter<'_> {
    /// Run statements in order until one finishes with something other than
    /// [`Control::Pass`].
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<Control> {
        for stmt in stmts {
            match self.exec(stmt)? {
                Control::Pass => {}
                other => return Ok(other),
            }
        }
        Ok(Control::Pass)
    }

    fn exec(&mut self, stmt: &Stmt) -> EvalResult<Control> {
        self.notify_debugger(stmt);
        self.exec_inner(stmt).map_err(|e| e.at(&stmt.location))
    }

    fn notify_debugger(&mut self, stmt: &Stmt) {
        let call_depth = self.thread.call_depth();
        if let Some(debugger) = self.thread.debugger_mut() {
            debugger.before_statement(&FrameView {
                location: &stmt.location,
                function: self.function.as_ref(),
                locals: &self.locals,
                module: &self.module,
                call_depth,
            });
        }
    }

    fn exec_inner(&mut self, stmt: &Stmt) -> EvalResult<Control> {
        match &stmt.kind {
            StmtKind::Assign { lhs, rhs } => {
                let value = self.eval(rhs)?;
                self.assign(lhs, value, false)?;
                Ok(Control::Pass)
            }
            StmtKind::AugAssign { lhs, op, rhs } => {
                self.aug_assign(lhs, *op, rhs)?;
                Ok(Control::Pass)
            }
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
                Ok(Control::Pass)
            }
            StmtKind::Flow(FlowKind::Pass) => Ok(Control::Pass),
            StmtKind::Flow(FlowKind::Break) => Ok(Control::Break),
            StmtKind::Flow(FlowKind::Continue) => Ok(Control::Continue),
            StmtKind::For {
                target,
                iterable,
                body,
            } => {
                let collection = self.eval(iterable)?;
                let items = collection.iterate(self.thread.semantics())?;
                let _lock = collection.lock_for_iteration(&stmt.location);
                for item in items {
                    self.thread.check_cancelled()?;
                    self.assign(target, item, false)?;
                    match self.exec_block(body)? {
                        Control::Break => break,
                        Control::Pass | Control::Continue => {}
                        ret @ Control::Return(_) => return Ok(ret),
                    }
                }
                Ok(Control::Pass)
            }
            StmtKind::Def(def) => {
                let mut defaults = Vec::new();
                for param in &def.params {
                    if let Parameter::Optional(_, default) = param {
                        defaults.push(self.eval(default)?);
                    }
                }
                let signature = FunctionSignature::from_parameters(&def.params)
                    .map_err(|err| invalid_signature(&err, &def.name.name))?;
                let function = UserFunction::new(
                    def.name.name.clone(),
                    signature,
                    defaults,
                    def.clone(),
                    self.module.clone(),
                );
                self.bind(&def.name, Value::function(function), false)?;
                Ok(Control::Pass)
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.truth() {
                    self.exec_block(then)
                } else {
                    self.exec_block(otherwise)
                }
            }
            StmtKind::Load(load) => {
                self.exec_load(load)?;
                Ok(Control::Pass)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::None,
                };
                Ok(Control::Return(value))
            }
        }
    }

    fn exec_load(&mut self, load: &LoadStatement) -> EvalResult<()> {
        let module = self
            .thread
            .module(&load.module)
            .cloned()
            .ok_or_else(|| unknown_module(&load.module))?;
        if !module.is_frozen() {
            return Err(unfrozen_module(&load.module).into());
        }
        for binding in &load.bindings {
            let value = match module.get(&binding.original) {
                Some(value) => value,
                None => {
                    let names = module.names();
                    let hint = suggest(&binding.original, names.iter().map(|n| n.as_str()));
                    return Err(unknown_symbol(&load.module, &binding.original, hint.as_deref()).into());
                }
            };
            self.bind(&binding.local, value, false)?;
        }
        Ok(())
    }
}
