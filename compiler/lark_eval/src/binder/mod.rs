//! Calling conventions: mapping a call site's arguments onto parameters.
//!
//! Interpreter-defined functions are bound against their
//! [`FunctionSignature`](crate::signature::FunctionSignature) by
//! [`bind_signature`]. Host methods are bound against their
//! [`MethodDescriptor`](crate::dispatch::MethodDescriptor) by
//! [`bind_descriptor`].
//!
//! Both take the arguments as the call site produced them: positional values
//! in order (including any `*args` expansion) and named arguments in call
//! order (including any `**kwargs` expansion). Duplicate names among the
//! named arguments are rejected at the call site before binding.

mod descriptor;
mod signature;

pub use descriptor::bind_descriptor;
pub use signature::bind_signature;

use lark_ir::Name;

use crate::value::Value;

/// Named arguments in call order.
pub type NamedArgs = Vec<(Name, Value)>;

#[cfg(test)]
mod tests;
