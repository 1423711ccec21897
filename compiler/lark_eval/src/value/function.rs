//! Callable values.

use std::sync::Arc;

use lark_ir::{DefStatement, Location, Name, Stmt};

use super::{TypeTag, Value};
use crate::dispatch::MethodDescriptor;
use crate::interpreter::Module;
use crate::signature::FunctionSignature;

/// A function defined by a `def` statement.
///
/// Default values are evaluated once, when the `def` executes, and are stored
/// for the optional slots in canonical order (optional positional parameters
/// first, then optional named-only ones).
pub struct UserFunction {
    name: Name,
    signature: FunctionSignature,
    defaults: Vec<Value>,
    def: Arc<DefStatement>,
    module: Arc<Module>,
}

impl UserFunction {
    pub(crate) fn new(
        name: Name,
        signature: FunctionSignature,
        defaults: Vec<Value>,
        def: Arc<DefStatement>,
        module: Arc<Module>,
    ) -> Self {
        UserFunction {
            name,
            signature,
            defaults,
            def,
            module,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn defaults(&self) -> &[Value] {
        &self.defaults
    }

    pub fn body(&self) -> &[Stmt] {
        &self.def.body
    }

    /// The module whose globals the body sees.
    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub fn location(&self) -> &Location {
        &self.def.location
    }

    /// `name(params)` with default values filled in, as shown in binding
    /// errors.
    pub fn rendered(&self) -> String {
        self.signature.render(&self.name, Some(&self.defaults))
    }
}

/// A host method or global function, possibly bound to a receiver.
pub struct BuiltinFunction {
    receiver: Option<Value>,
    receiver_type: TypeTag,
    descriptor: &'static MethodDescriptor,
}

impl BuiltinFunction {
    pub(crate) fn new(
        receiver: Option<Value>,
        receiver_type: TypeTag,
        descriptor: &'static MethodDescriptor,
    ) -> Self {
        BuiltinFunction {
            receiver,
            receiver_type,
            descriptor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_ref()
    }

    pub fn receiver_type(&self) -> TypeTag {
        self.receiver_type
    }

    pub fn descriptor(&self) -> &'static MethodDescriptor {
        self.descriptor
    }
}
