//! Assignment targets: names, elements and destructuring.

use lark_ir::{BinaryOp, Expr, ExprKind, Identifier, Scope};

use super::{index, operators, Interpreter};
use crate::errors::{assignment_length, cannot_assign, empty_lvalue, EvalError, EvalResult};
use crate::value::Value;

impl Interpreter<'_> {
    /// Bind `value` to `target`. With `local`, names always bind in the
    /// frame's locals (comprehension variables).
    pub(crate) fn assign(&mut self, target: &Expr, value: Value, local: bool) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Ident(ident) => Ok(self.bind(ident, value, local)?),
            ExprKind::Index { object, key } => {
                let object = self.eval(object)?;
                let key = self.eval(key)?;
                index::set_index(&object, key, value, self.thread.mutability())
                    .map_err(|e| e.with_location(&target.location).into())
            }
            ExprKind::List(targets) | ExprKind::Tuple(targets) => {
                if targets.is_empty() {
                    return Err(empty_lvalue().with_location(&target.location).into());
                }
                let values = value
                    .iterate(self.thread.semantics())
                    .map_err(|e| e.with_location(&target.location))?;
                if values.len() != targets.len() {
                    return Err(assignment_length(targets.len(), values.len())
                        .with_location(&target.location)
                        .into());
                }
                for (target, value) in targets.iter().zip(values) {
                    self.assign(target, value, local)?;
                }
                Ok(())
            }
            _ => Err(cannot_assign(&describe(target))
                .with_location(&target.location)
                .into()),
        }
    }

    pub(crate) fn bind(
        &mut self,
        ident: &Identifier,
        value: Value,
        local: bool,
    ) -> Result<(), EvalError> {
        let global = !local
            && match ident.scope {
                Some(Scope::Module) => true,
                Some(Scope::Local) => false,
                Some(Scope::Universe) => return Err(cannot_assign(&ident.name)),
                None => self.toplevel,
            };
        if global {
            self.module.set(ident.name.clone(), value)
        } else {
            self.locals.insert(ident.name.clone(), value);
            Ok(())
        }
    }

    /// `lhs op= rhs`. The object and key of an element target are evaluated
    /// once; `list += list` extends the left list in place.
    pub(crate) fn aug_assign(&mut self, lhs: &Expr, op: BinaryOp, rhs: &Expr) -> EvalResult<()> {
        match &lhs.kind {
            ExprKind::Ident(ident) => {
                let current = self.lookup(ident).map_err(|e| e.with_location(&lhs.location))?;
                let operand = self.eval(rhs)?;
                let updated = self
                    .combine(op, &current, &operand)
                    .map_err(|e| e.with_location(&lhs.location))?;
                Ok(self.bind(ident, updated, false)?)
            }
            ExprKind::Index { object, key } => {
                let object = self.eval(object)?;
                let key = self.eval(key)?;
                let current =
                    index::index(&object, &key).map_err(|e| e.with_location(&lhs.location))?;
                let operand = self.eval(rhs)?;
                let updated = self
                    .combine(op, &current, &operand)
                    .map_err(|e| e.with_location(&lhs.location))?;
                index::set_index(&object, key, updated, self.thread.mutability())
                    .map_err(|e| e.with_location(&lhs.location).into())
            }
            _ => Err(cannot_assign(&describe(lhs))
                .with_location(&lhs.location)
                .into()),
        }
    }

    fn combine(&self, op: BinaryOp, current: &Value, operand: &Value) -> Result<Value, EvalError> {
        if let (BinaryOp::Plus, Value::List(list), Value::List(other)) = (op, current, operand) {
            list.extend(other.to_vec(), self.thread.mutability())?;
            return Ok(current.clone());
        }
        operators::binary_op(op, current, operand, &*self.thread)
    }
}

/// Short rendering of a non-assignable target.
fn describe(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Int(n) => n.to_string(),
        ExprKind::Str(s) => format!("{s:?}"),
        ExprKind::Dot { field, .. } => format!("<expr>.{field}"),
        ExprKind::Call(_) => "function call".to_string(),
        _ => "expression".to_string(),
    }
}
