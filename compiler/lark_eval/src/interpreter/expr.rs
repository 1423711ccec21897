//! Expression evaluation, name lookup and attribute access.

use lark_ir::{BinaryOp, Expr, ExprKind, Identifier, Scope};

use super::{operators, Interpreter, Thread};
use crate::dispatch::Invocation;
use crate::errors::{
    duplicate_dict_key, local_before_assignment, missing_attribute, undefined_name, EvalError,
    EvalResult,
};
use crate::suggest::suggest;
use crate::value::{BuiltinFunction, DictEntries, HashKey, Heap, Value};

impl Interpreter<'_> {
    /// Evaluate `expr`, attributing any error to it unless a nested node
    /// already claimed it.
    pub(crate) fn eval(&mut self, expr: &Expr) -> EvalResult {
        lark_stack::ensure_sufficient_stack(|| self.eval_inner(expr))
            .map_err(|e| e.at(&expr.location))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Ident(ident) => Ok(self.lookup(ident)?),
            ExprKind::Int(n) => Ok(Value::int(*n)),
            ExprKind::Str(s) => Ok(Value::Str(Heap::from_arc(s.clone()))),
            ExprKind::List(items) => {
                let values = self.eval_all(items)?;
                Ok(Value::list(values, self.thread.mutability()))
            }
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            ExprKind::Dict(entries) => {
                let mut dict = DictEntries::default();
                for (key, value) in entries {
                    let key = self.eval(key)?;
                    let value = self.eval(value)?;
                    let key = HashKey::new(key)?;
                    if dict.contains_key(&key) {
                        return Err(duplicate_dict_key(&key.value().repr()).into());
                    }
                    dict.insert(key, value);
                }
                Ok(Value::dict(dict, self.thread.mutability()))
            }
            ExprKind::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                lhs,
                rhs,
            } => {
                let left = self.eval(lhs)?;
                if left.truth() == (*op == BinaryOp::And) {
                    self.eval(rhs)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.eval(lhs)?;
                let right = self.eval(rhs)?;
                Ok(operators::binary_op(*op, &left, &right, self.thread)?)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(operators::unary_op(*op, &value)?)
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.truth() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            ExprKind::Dot { object, field } => {
                let object = self.eval(object)?;
                get_attribute(self.thread, &object, field)
            }
            ExprKind::Index { object, key } => {
                let object = self.eval(object)?;
                let key = self.eval(key)?;
                Ok(super::index::index(&object, &key)?)
            }
            ExprKind::Slice {
                object,
                start,
                end,
                step,
            } => {
                let object = self.eval(object)?;
                let start = self.eval_optional(start.as_deref())?;
                let end = self.eval_optional(end.as_deref())?;
                let step = self.eval_optional(step.as_deref())?;
                Ok(super::index::slice(
                    &object,
                    &start,
                    &end,
                    &step,
                    self.thread.mutability(),
                )?)
            }
            ExprKind::Call(call) => self.eval_call(call, expr),
            ExprKind::Comprehension(comp) => self.eval_comprehension(comp, expr),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn eval_optional(&mut self, expr: Option<&Expr>) -> EvalResult {
        match expr {
            Some(expr) => self.eval(expr),
            None => Ok(Value::None),
        }
    }

    /// Resolve an identifier. Unresolved identifiers search locals, then
    /// globals, then the universe.
    pub(crate) fn lookup(&self, ident: &Identifier) -> Result<Value, EvalError> {
        let name = ident.name.as_str();
        let found = match ident.scope {
            Some(Scope::Local) => {
                return self
                    .locals
                    .get(name)
                    .cloned()
                    .ok_or_else(|| local_before_assignment(name));
            }
            Some(Scope::Module) => self.module.get(name),
            Some(Scope::Universe) => self.thread.universe(name)?,
            None => match self.locals.get(name) {
                Some(value) => Some(value.clone()),
                None => match self.module.get(name) {
                    Some(value) => Some(value),
                    None => self.thread.universe(name)?,
                },
            },
        };
        match found {
            Some(value) => Ok(value),
            None => Err(self.undefined(name)),
        }
    }

    #[cold]
    fn undefined(&self, name: &str) -> EvalError {
        let globals = self.module.names();
        let universe = self.thread.universe_names().unwrap_or_default();
        let candidates = self
            .locals
            .keys()
            .map(|n| n.as_str())
            .chain(globals.iter().map(|n| n.as_str()))
            .chain(universe.iter().copied());
        undefined_name(name, suggest(name, candidates).as_deref())
    }
}

/// `object.name`: a struct field, a host field computed on access, or a
/// method bound to `object`.
pub(crate) fn get_attribute(thread: &mut Thread, object: &Value, name: &str) -> EvalResult {
    if let Value::Struct(s) = object {
        if let Some(value) = s.get(name) {
            return Ok(value.clone());
        }
    }
    let tag = object.type_tag();
    let table = thread.table(tag)?;
    if let Some(field) = table.field(name) {
        let mut invocation = Invocation::new(field, tag, Some(object.clone()), Vec::new());
        invocation.set_thread(thread);
        return (field.imp)(&mut invocation);
    }
    if let Some(method) = table.get(name) {
        return Ok(Value::builtin(BuiltinFunction::new(
            Some(object.clone()),
            tag,
            method,
        )));
    }
    let names = attribute_names(thread, object)?;
    let hint = suggest(name, names.iter().map(String::as_str));
    Err(missing_attribute(object.type_name(), name, hint.as_deref()).into())
}

/// Fields and methods of `object`, sorted, as listed by `dir()`.
pub(crate) fn attribute_names(thread: &Thread, object: &Value) -> Result<Vec<String>, EvalError> {
    let mut names: Vec<String> = thread
        .table(object.type_tag())?
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    if let Value::Struct(s) = object {
        names.extend(s.field_names().map(|n| n.to_string()));
    }
    names.sort();
    names.dedup();
    Ok(names)
}

/// Whether `object.name` would succeed.
pub(crate) fn has_attribute(thread: &Thread, object: &Value, name: &str) -> Result<bool, EvalError> {
    if let Value::Struct(s) = object {
        if s.get(name).is_some() {
            return Ok(true);
        }
    }
    Ok(thread.table(object.type_tag())?.get(name).is_some())
}
