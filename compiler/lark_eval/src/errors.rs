//! Error types for evaluation.
//!
//! Every failure is an [`EvalError`]: a structured [`EvalErrorKind`] for
//! programmatic matching plus a stable, user-facing message. Messages are
//! part of the contract with script authors and tools that grep for them, so
//! they are produced only by the `#[cold]` factory functions in this module.
//!
//! Errors are enriched as they propagate, never mutated in place:
//! [`EvalError::with_location`] records the node that raised the error (the
//! first one wins) and [`EvalError::with_frame`] appends a stack frame each
//! time the error crosses a call boundary.
//!
//! [`EvalAbort`] is what the evaluator itself returns: either an error or
//! cancellation, which is not an error and must not be reported as one.

use std::fmt::{self, Write as _};

use lark_ir::{BinaryOp, Location, Name, UnaryOp};

use crate::signature::SignatureError;

/// Result of evaluating an expression.
pub type EvalResult<T = crate::Value> = Result<T, EvalAbort>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Binding
    Arity,
    MissingArgument,
    PassedTwice,
    MultipleValues,
    UnexpectedKeyword,
    ArgumentType,
    NoneNotAllowed,
    DisabledParameter { flag: String },

    // Mutability
    FrozenObject,
    LockedObject,

    // Depset
    DepsetContentType,
    DepsetOrder,
    DepsetDepth,
    DepsetElement,

    // Evaluation
    Uncomparable,
    UnsupportedOperator,
    DivisionByZero,
    IntegerOverflow,
    NotIterable,
    AssignmentArity,
    UndefinedVariable { name: String },
    MissingAttribute { type_name: String, name: String },
    NotCallable,
    IndexOutOfRange,
    KeyNotFound,
    Unhashable,
    TypeMismatch,
    InvalidValue,
    Recursion,
    CallDepth,
    Signature,
    Load,
    DisabledFeature { flag: String },

    /// Raised by the `fail` builtin.
    Fail,
    /// Host-side configuration problem, such as an invalid dispatch table.
    Internal,
}

/// One call boundary crossed by a propagating error.
#[derive(Clone, Debug, PartialEq)]
pub struct StackFrame {
    /// Name of the function that was being called.
    pub function: Name,
    /// Location of the call expression.
    pub location: Location,
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// The node at which the error was first raised.
    pub location: Option<Location>,
    /// Call frames, innermost first.
    pub stack: Vec<StackFrame>,
}

impl EvalError {
    /// Create an error with a kind and message.
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            location: None,
            stack: Vec::new(),
        }
    }

    /// Record where the error was raised, unless a location is already set.
    #[must_use]
    pub fn with_location(mut self, location: &Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location.clone());
        }
        self
    }

    /// Append a frame for a call boundary the error is propagating through.
    #[must_use]
    pub fn with_frame(mut self, function: Name, location: Location) -> Self {
        self.stack.push(StackFrame { function, location });
        self
    }

    /// Format a traceback, outermost call first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.stack.is_empty() {
            out.push_str("Traceback (most recent call last):\n");
            for frame in self.stack.iter().rev() {
                let _ = writeln!(out, "\t{frame}");
            }
        }
        match &self.location {
            Some(location) => {
                let _ = write!(out, "Error at {location}: {}", self.message);
            }
            None => {
                let _ = write!(out, "Error: {}", self.message);
            }
        }
        out
    }
}

/// Why evaluation stopped early.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalAbort {
    #[error("{0}")]
    Error(Box<EvalError>),
    /// The thread's cancellation token fired.
    #[error("evaluation cancelled")]
    Cancelled,
}

impl EvalAbort {
    /// Record a location on the wrapped error; cancellation passes through.
    #[must_use]
    pub fn at(self, location: &Location) -> Self {
        match self {
            EvalAbort::Error(err) => EvalAbort::Error(Box::new(err.with_location(location))),
            EvalAbort::Cancelled => EvalAbort::Cancelled,
        }
    }

    /// Attribute the wrapped error to a call of `function` at `location`.
    #[must_use]
    pub fn in_frame(self, function: &str, location: &Location) -> Self {
        match self {
            EvalAbort::Error(err) => EvalAbort::Error(Box::new(
                err.with_location(location)
                    .with_frame(Name::from(function), location.clone()),
            )),
            EvalAbort::Cancelled => EvalAbort::Cancelled,
        }
    }

    /// The wrapped error, if this is not a cancellation.
    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            EvalAbort::Error(err) => Some(err),
            EvalAbort::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EvalAbort::Cancelled)
    }
}

impl From<EvalError> for EvalAbort {
    fn from(err: EvalError) -> Self {
        EvalAbort::Error(Box::new(err))
    }
}

fn quoted_list(names: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "'{}'", name.as_ref());
    }
    out
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn with_suggestion(mut message: String, suggestion: Option<&str>) -> String {
    if let Some(s) = suggestion {
        let _ = write!(message, " (did you mean '{s}'?)");
    }
    message
}

// Signature binding

#[cold]
pub fn too_many_positional(got: usize, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Arity,
        format!("too many ({got}) positional arguments in call to {callee}"),
    )
}

#[cold]
pub fn no_positional_accepted(callee: &str, got: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::Arity,
        format!("{callee} does not accept positional arguments, but got {got}"),
    )
}

#[cold]
pub fn insufficient_arguments(callee: &str, got: usize, expected: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::Arity,
        format!(
            "insufficient arguments received by {callee} (got {got}, expected at least {expected})"
        ),
    )
}

#[cold]
pub fn missing_mandatory_keywords(callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingArgument,
        format!("missing mandatory keyword arguments in call to {callee}"),
    )
}

/// Names passed both positionally and by keyword; `names` must already be sorted.
#[cold]
pub fn passed_both(names: &[Name], callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::PassedTwice,
        format!(
            "argument{} {} passed both by position and by name in call to {callee}",
            plural(names.len()),
            quoted_list(names)
        ),
    )
}

/// Keywords no parameter accepts; `names` must already be sorted.
#[cold]
pub fn unexpected_keywords(names: &[Name], callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UnexpectedKeyword,
        format!(
            "unexpected keyword{} {} in call to {callee}",
            plural(names.len()),
            quoted_list(names)
        ),
    )
}

#[cold]
pub fn multiple_values(callee: &str, name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MultipleValues,
        format!("{callee} got multiple values for keyword argument '{name}'"),
    )
}

#[cold]
pub fn missing_positional(name: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingArgument,
        format!("missing mandatory positional argument '{name}' while calling {callee}"),
    )
}

#[cold]
pub fn missing_named_only(name: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingArgument,
        format!("missing mandatory named-only argument '{name}' while calling {callee}"),
    )
}

// Descriptor binding

#[cold]
pub fn argument_type(expected: &str, param: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ArgumentType,
        format!("expected value of type '{expected}' for parameter '{param}', for call to {callee}"),
    )
}

#[cold]
pub fn no_default(param: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingArgument,
        format!("parameter '{param}' has no default value, for call to {callee}"),
    )
}

#[cold]
pub fn not_named(param: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingArgument,
        format!("parameter '{param}' may not be specified by name, for call to {callee}"),
    )
}

#[cold]
pub fn none_not_allowed(param: &str, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NoneNotAllowed,
        format!("parameter '{param}' cannot be None, for call to {callee}"),
    )
}

#[cold]
pub fn too_many_for_descriptor(max: usize, got: usize, callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Arity,
        format!(
            "expected no more than {max} positional arguments, but got {got}, for call to {callee}"
        ),
    )
}

/// A keyword naming a parameter switched off by an `incompatible_*` flag.
#[cold]
pub fn deprecated_parameter(param: &str, flag: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DisabledParameter {
            flag: flag.to_string(),
        },
        format!(
            "parameter '{param}' is deprecated and will be removed soon. \
             It may be temporarily re-enabled by setting --{flag}=false"
        ),
    )
}

/// A keyword naming a parameter that needs an `experimental_*` flag.
#[cold]
pub fn experimental_parameter(param: &str, flag: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DisabledParameter {
            flag: flag.to_string(),
        },
        format!(
            "parameter '{param}' is experimental and thus unavailable with the current flags. \
             It may be enabled by setting --{flag}"
        ),
    )
}

// Mutability

#[cold]
pub fn frozen_object() -> EvalError {
    EvalError::new(EvalErrorKind::FrozenObject, "trying to mutate a frozen object")
}

#[cold]
pub fn locked_object(locations: &[Location]) -> EvalError {
    let mut message = String::from(
        "trying to mutate a locked object (is it currently being iterated over by a for loop \
         or comprehension?)\nObject locked at the following location(s): ",
    );
    for (i, location) in locations.iter().enumerate() {
        if i > 0 {
            message.push_str(", ");
        }
        let _ = write!(message, "{location}");
    }
    EvalError::new(EvalErrorKind::LockedObject, message)
}

#[cold]
pub fn frozen_global(name: &str, module: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::FrozenObject,
        format!("cannot reassign global '{name}' of frozen module '{module}'"),
    )
}

// Depsets

#[cold]
pub fn depset_content_type(item: &str, set: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DepsetContentType,
        format!("cannot add an item of type '{item}' to a depset of '{set}'"),
    )
}

#[cold]
pub fn depset_order(left: &str, right: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DepsetOrder,
        format!("Order '{left}' is incompatible with order '{right}'"),
    )
}

#[cold]
pub fn depset_depth(limit: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::DepsetDepth,
        format!(
            "depset exceeded maximum depth {limit}. This was only discovered when attempting \
             to flatten the depset for to_list(), as the size of depsets is unknown until \
             flattening."
        ),
    )
}

#[cold]
pub fn depset_element(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DepsetElement,
        format!("depsets cannot contain items of type '{type_name}'"),
    )
}

#[cold]
pub fn depset_invalid_order(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidValue, format!("Invalid order: {name}"))
}

#[cold]
pub fn depset_union_disabled(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::DisabledFeature {
            flag: crate::semantics::flags::INCOMPATIBLE_DEPSET_UNION.to_string(),
        },
        format!(
            "{what} on a depset is forbidden. Use the depset constructor with the 'transitive' \
             parameter instead. Use --{}=false to temporarily disable this check.",
            crate::semantics::flags::INCOMPATIBLE_DEPSET_UNION
        ),
    )
}

#[cold]
pub fn depset_not_iterable() -> EvalError {
    EvalError::new(
        EvalErrorKind::DisabledFeature {
            flag: crate::semantics::flags::INCOMPATIBLE_DEPSET_IS_NOT_ITERABLE.to_string(),
        },
        format!(
            "type 'depset' is not iterable. Use the `to_list()` method to get a list. \
             Use --{}=false to temporarily disable this check.",
            crate::semantics::flags::INCOMPATIBLE_DEPSET_IS_NOT_ITERABLE
        ),
    )
}

// Operators and values

#[cold]
pub fn cannot_compare(left: &str, right: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Uncomparable,
        format!("Cannot compare {left} with {right}"),
    )
}

/// Two values of a kind that has no ordering at all, e.g. `structs`.
#[cold]
pub fn cannot_compare_kind(plural_kind: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Uncomparable,
        format!("Cannot compare {plural_kind}"),
    )
}

#[cold]
pub fn unsupported_binary(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UnsupportedOperator,
        format!(
            "unsupported operand type(s) for {}: '{left}' and '{right}'",
            op.as_symbol()
        ),
    )
}

#[cold]
pub fn unsupported_unary(op: UnaryOp, operand: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UnsupportedOperator,
        format!("unsupported operand type for {}: '{operand}'", op.as_symbol()),
    )
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, "integer division by zero")
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, "integer modulo by zero")
}

#[cold]
pub fn integer_overflow() -> EvalError {
    EvalError::new(EvalErrorKind::IntegerOverflow, "integer overflow")
}

#[cold]
pub fn negative_shift(count: i64) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidValue,
        format!("negative shift count: {count}"),
    )
}

#[cold]
pub fn slash_disabled() -> EvalError {
    EvalError::new(
        EvalErrorKind::DisabledFeature {
            flag: crate::semantics::flags::INCOMPATIBLE_DISALLOW_SLASH_OPERATOR.to_string(),
        },
        format!(
            "The `/` operator is not allowed. Please use the `//` operator for integer division. \
             You can temporarily enable the `/` operator by passing the flag --{}=false",
            crate::semantics::flags::INCOMPATIBLE_DISALLOW_SLASH_OPERATOR
        ),
    )
}

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NotIterable,
        format!("type '{type_name}' is not iterable"),
    )
}

#[cold]
pub fn empty_lvalue() -> EvalError {
    EvalError::new(EvalErrorKind::AssignmentArity, "lvalue list is empty")
}

#[cold]
pub fn assignment_length(lhs: usize, rhs: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::AssignmentArity,
        format!(
            "assignment length mismatch: left-hand side has length {lhs}, \
             but right-hand side evaluates to value of length {rhs}"
        ),
    )
}

#[cold]
pub fn cannot_assign(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("cannot assign to '{what}'"),
    )
}

#[cold]
pub fn local_before_assignment(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedVariable {
            name: name.to_string(),
        },
        format!("local variable '{name}' is referenced before assignment."),
    )
}

#[cold]
pub fn undefined_name(name: &str, suggestion: Option<&str>) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedVariable {
            name: name.to_string(),
        },
        with_suggestion(format!("name '{name}' is not defined"), suggestion),
    )
}

#[cold]
pub fn missing_attribute(type_name: &str, name: &str, suggestion: Option<&str>) -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingAttribute {
            type_name: type_name.to_string(),
            name: name.to_string(),
        },
        with_suggestion(
            format!("object of type '{type_name}' has no field or method '{name}'"),
            suggestion,
        ),
    )
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NotCallable,
        format!("'{type_name}' object is not callable"),
    )
}

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::IndexOutOfRange,
        format!("index out of range (index is {index}, but sequence has {len} elements)"),
    )
}

#[cold]
pub fn key_not_found(key_repr: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::KeyNotFound,
        format!("key {key_repr} not found in dictionary"),
    )
}

#[cold]
pub fn duplicate_dict_key(key_repr: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidValue,
        format!("Duplicated key {key_repr} when creating dictionary"),
    )
}

#[cold]
pub fn slice_step_zero() -> EvalError {
    EvalError::new(EvalErrorKind::InvalidValue, "slice step cannot be zero")
}

#[cold]
pub fn invalid_index_type(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("indices must be integers, not '{type_name}'"),
    )
}

#[cold]
pub fn not_indexable(type_name: &str, key_type: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("type '{type_name}' has no operator [](...) for '{key_type}'"),
    )
}

#[cold]
pub fn unsupported_item_assignment(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("can only assign an element in a dictionary or a list, not in a '{type_name}'"),
    )
}

#[cold]
pub fn in_requires_string(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("'in <string>' requires string as left operand, not '{type_name}'"),
    )
}

#[cold]
pub fn format_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidValue, message)
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Unhashable,
        format!("unhashable type: '{type_name}'"),
    )
}

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::TypeMismatch, message)
}

#[cold]
pub fn sequence_too_long(requested: u128) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidValue,
        format!(
            "result of {requested} elements exceeds the maximum sequence length of {}",
            crate::value::MAX_SEQUENCE_LENGTH
        ),
    )
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidValue, message)
}

// Calls

#[cold]
pub fn recursion(callee: &str, caller: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Recursion,
        format!("Recursion was detected when calling '{callee}' from '{caller}'"),
    )
}

#[cold]
pub fn call_depth_exceeded(limit: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::CallDepth,
        format!("maximum call depth exceeded (limit: {limit})"),
    )
}

#[cold]
pub fn star_not_iterable(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("argument after * must be an iterable, not '{type_name}'"),
    )
}

#[cold]
pub fn star_star_not_dict(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("argument after ** must be a dictionary, not '{type_name}'"),
    )
}

#[cold]
pub fn keywords_not_strings(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeMismatch,
        format!("keywords must be strings, not '{type_name}'"),
    )
}

/// Keywords supplied more than once at a call site; `names` must be sorted.
#[cold]
pub fn duplicate_keywords(names: &[Name], callee: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MultipleValues,
        format!(
            "duplicate keyword{} {} in call to {callee}",
            plural(names.len()),
            quoted_list(names)
        ),
    )
}

#[cold]
pub fn invalid_signature(err: &SignatureError, function: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Signature,
        format!("invalid signature for function '{function}': {err}"),
    )
}

// Modules

#[cold]
pub fn unknown_module(module: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Load,
        format!("cannot load '{module}': no such module"),
    )
}

#[cold]
pub fn unknown_symbol(module: &str, symbol: &str, suggestion: Option<&str>) -> EvalError {
    EvalError::new(
        EvalErrorKind::Load,
        with_suggestion(
            format!("file '{module}' does not contain symbol '{symbol}'"),
            suggestion,
        ),
    )
}

#[cold]
pub fn unfrozen_module(module: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Load,
        format!("cannot load '{module}': module is still being evaluated"),
    )
}

// Host

#[cold]
pub fn fail(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Fail, message)
}

#[cold]
pub fn internal(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Internal, message)
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: in call to {}", self.location, self.function)
    }
}

#[cfg(test)]
mod tests;
