//! List and dict comprehensions.
//!
//! Loop variables bind as locals of the current frame and are restored when
//! the comprehension finishes, so they never leak into the enclosing scope.

use lark_ir::{Clause, Comprehension, ComprehensionBody, Expr, ExprKind, Name};

use super::Interpreter;
use crate::errors::EvalResult;
use crate::value::{DictEntries, HashKey, Value};

enum Output {
    List(Vec<Value>),
    Dict(DictEntries),
}

impl Interpreter<'_> {
    pub(crate) fn eval_comprehension(&mut self, comp: &Comprehension, expr: &Expr) -> EvalResult {
        let mut names = Vec::new();
        for clause in &comp.clauses {
            if let Clause::For { target, .. } = clause {
                collect_targets(target, &mut names);
            }
        }
        let saved: Vec<(Name, Option<Value>)> = names
            .into_iter()
            .map(|name| {
                let previous = self.locals.get(&name).cloned();
                (name, previous)
            })
            .collect();

        let mut output = match comp.body {
            ComprehensionBody::List(_) => Output::List(Vec::new()),
            ComprehensionBody::Dict { .. } => Output::Dict(DictEntries::default()),
        };
        let result = self.run_clauses(comp, 0, &mut output, expr);

        for (name, previous) in saved {
            match previous {
                Some(value) => {
                    self.locals.insert(name, value);
                }
                None => {
                    self.locals.remove(&name);
                }
            }
        }
        result?;

        let mutability = self.thread.mutability();
        Ok(match output {
            Output::List(items) => Value::list(items, mutability),
            Output::Dict(entries) => Value::dict(entries, mutability),
        })
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "clause index is bounded by the clause list"
    )]
    fn run_clauses(
        &mut self,
        comp: &Comprehension,
        index: usize,
        output: &mut Output,
        expr: &Expr,
    ) -> EvalResult<()> {
        let Some(clause) = comp.clauses.get(index) else {
            return self.emit(&comp.body, output);
        };
        match clause {
            Clause::For { target, iterable } => {
                let collection = self.eval(iterable)?;
                let items = collection
                    .iterate(self.thread.semantics())
                    .map_err(|e| e.with_location(&iterable.location))?;
                let _lock = collection.lock_for_iteration(&expr.location);
                for item in items {
                    self.thread.check_cancelled()?;
                    self.assign(target, item, true)?;
                    self.run_clauses(comp, index + 1, output, expr)?;
                }
                Ok(())
            }
            Clause::If(cond) => {
                if self.eval(cond)?.truth() {
                    self.run_clauses(comp, index + 1, output, expr)?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, body: &ComprehensionBody, output: &mut Output) -> EvalResult<()> {
        match (body, output) {
            (ComprehensionBody::List(value), Output::List(items)) => {
                items.push(self.eval(value)?);
            }
            (ComprehensionBody::Dict { key, value }, Output::Dict(entries)) => {
                let k = self.eval(key)?;
                let v = self.eval(value)?;
                let k = HashKey::new(k).map_err(|e| e.with_location(&key.location))?;
                entries.insert(k, v);
            }
            // The output is chosen from the body kind.
            _ => {}
        }
        Ok(())
    }
}

fn collect_targets(target: &Expr, names: &mut Vec<Name>) {
    match &target.kind {
        ExprKind::Ident(ident) => {
            if !names.contains(&ident.name) {
                names.push(ident.name.clone());
            }
        }
        ExprKind::List(items) | ExprKind::Tuple(items) => {
            for item in items {
                collect_targets(item, names);
            }
        }
        _ => {}
    }
}
