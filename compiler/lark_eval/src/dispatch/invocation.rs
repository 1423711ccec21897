//! Arguments handed to a host method implementation.

use lark_ir::{Expr, Location};

use super::MethodDescriptor;
use crate::errors::{internal, EvalError};
use crate::interpreter::Thread;
use crate::mutability::Mutability;
use crate::semantics::Semantics;
use crate::value::{TypeTag, Value};

/// A bound call of a host method.
///
/// `args` holds one value per declared parameter, followed by the `*args`
/// tuple and the `**kwargs` dict when the descriptor accepts them. Extras are
/// present only when the descriptor asked for them.
pub struct Invocation<'a> {
    descriptor: &'static MethodDescriptor,
    receiver_type: TypeTag,
    receiver: Option<Value>,
    args: Vec<Value>,
    location: Option<Location>,
    call: Option<&'a Expr>,
    thread: Option<&'a mut Thread>,
    semantics: Option<Semantics>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        descriptor: &'static MethodDescriptor,
        receiver_type: TypeTag,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> Self {
        Invocation {
            descriptor,
            receiver_type,
            receiver,
            args,
            location: None,
            call: None,
            thread: None,
            semantics: None,
        }
    }

    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    pub(crate) fn set_call_expr(&mut self, call: &'a Expr) {
        self.call = Some(call);
    }

    pub(crate) fn set_thread(&mut self, thread: &'a mut Thread) {
        self.thread = Some(thread);
    }

    pub(crate) fn set_semantics(&mut self, semantics: Semantics) {
        self.semantics = Some(semantics);
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// `method name(params) of 'type'`, for error messages.
    pub fn rendered(&self) -> String {
        self.descriptor.render(self.receiver_type)
    }

    fn missing(&self, what: &str) -> EvalError {
        missing(self.descriptor, self.receiver_type, what)
    }

    pub fn receiver(&self) -> Result<&Value, EvalError> {
        self.receiver.as_ref().ok_or_else(|| self.missing("a receiver"))
    }

    pub fn arg(&self, index: usize) -> Result<&Value, EvalError> {
        self.args
            .get(index)
            .ok_or_else(|| self.missing("enough arguments"))
    }

    pub fn int(&self, index: usize) -> Result<i64, EvalError> {
        self.arg(index)?
            .as_int()
            .ok_or_else(|| self.missing("an int argument"))
    }

    /// An int parameter that may be `None`.
    pub fn opt_int(&self, index: usize) -> Result<Option<i64>, EvalError> {
        match self.arg(index)? {
            Value::None => Ok(None),
            other => other
                .as_int()
                .map(Some)
                .ok_or_else(|| self.missing("an int argument")),
        }
    }

    pub fn string(&self, index: usize) -> Result<&str, EvalError> {
        self.arg(index)?
            .as_str()
            .ok_or_else(|| self.missing("a string argument"))
    }

    pub fn opt_string(&self, index: usize) -> Result<Option<&str>, EvalError> {
        match self.arg(index)? {
            Value::None => Ok(None),
            other => other
                .as_str()
                .map(Some)
                .ok_or_else(|| self.missing("a string argument")),
        }
    }

    /// The surplus positional arguments.
    pub fn varargs(&self) -> &[Value] {
        if !self.descriptor.extra_positional {
            return &[];
        }
        match self.args.get(self.descriptor.params.len()) {
            Some(Value::Tuple(items)) => items,
            _ => &[],
        }
    }

    /// The surplus keyword arguments, in call order.
    pub fn kwargs(&self) -> Vec<(Value, Value)> {
        if !self.descriptor.extra_keyword {
            return Vec::new();
        }
        match self.args.last() {
            Some(Value::Dict(dict)) => dict.items(),
            _ => Vec::new(),
        }
    }

    pub fn location(&self) -> Result<&Location, EvalError> {
        self.location
            .as_ref()
            .ok_or_else(|| self.missing("its location"))
    }

    pub fn call_expr(&self) -> Result<&'a Expr, EvalError> {
        self.call.ok_or_else(|| self.missing("its call expression"))
    }

    pub fn semantics(&self) -> Result<&Semantics, EvalError> {
        self.semantics
            .as_ref()
            .ok_or_else(|| self.missing("the semantics"))
    }

    pub fn thread(&mut self) -> Result<&mut Thread, EvalError> {
        let (descriptor, receiver_type) = (self.descriptor, self.receiver_type);
        self.thread
            .as_deref_mut()
            .ok_or_else(|| missing(descriptor, receiver_type, "the thread"))
    }

    /// Domain of the calling thread, which owns any list or dict the method
    /// creates and must match any it mutates.
    pub fn mutability(&self) -> Result<Mutability, EvalError> {
        match self.thread.as_deref() {
            Some(thread) => Ok(thread.mutability().clone()),
            None => Err(self.missing("the thread")),
        }
    }
}

#[cold]
fn missing(descriptor: &MethodDescriptor, receiver_type: TypeTag, what: &str) -> EvalError {
    internal(format!(
        "{} was invoked without {what}",
        descriptor.render(receiver_type)
    ))
}
