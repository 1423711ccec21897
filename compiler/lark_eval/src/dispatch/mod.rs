//! Host-exposed methods and the tables used to find them.
//!
//! Every method or global function implemented in Rust is described by a
//! static [`MethodDescriptor`]: its exposed name, parameter descriptors,
//! which interpreter-supplied extras it wants, and its feature-flag gate.
//! Descriptors are registered per [`TypeTag`] in a [`MethodRegistry`].
//! [`DispatchTable::build`] turns the registered descriptors of one type into
//! the name lookup tables for one [`Semantics`], and the [`DispatchCache`]
//! memoizes those tables.

mod cache;
mod invocation;

use std::fmt::Write as _;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

pub use cache::DispatchCache;
pub use invocation::Invocation;

use crate::errors::EvalAbort;
use crate::mutability::Mutability;
use crate::semantics::Semantics;
use crate::value::{TypeTag, Value};

/// Implementation of a host method.
pub type BuiltinImpl = fn(&mut Invocation<'_>) -> Result<Value, EvalAbort>;

/// Static type accepted by a host parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Int,
    String,
    List,
    Tuple,
    Dict,
    /// A list or a tuple.
    Sequence,
    /// Anything a `for` loop accepts.
    Iterable,
    Depset,
    Callable,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Any => "object",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::String => "string",
            ParamType::List => "list",
            ParamType::Tuple => "tuple",
            ParamType::Dict => "dict",
            ParamType::Sequence => "sequence",
            ParamType::Iterable => "iterable",
            ParamType::Depset => "depset",
            ParamType::Callable => "function",
        }
    }

    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::Any => true,
            ParamType::Bool => matches!(value, Value::Bool(_)),
            ParamType::Int => matches!(value, Value::Int(_)),
            ParamType::String => matches!(value, Value::Str(_)),
            ParamType::List => matches!(value, Value::List(_)),
            ParamType::Tuple => matches!(value, Value::Tuple(_)),
            ParamType::Dict => matches!(value, Value::Dict(_)),
            ParamType::Sequence => matches!(value, Value::List(_) | Value::Tuple(_)),
            ParamType::Iterable => matches!(
                value,
                Value::List(_) | Value::Tuple(_) | Value::Dict(_) | Value::Depset(_)
            ),
            ParamType::Depset => matches!(value, Value::Depset(_)),
            ParamType::Callable => matches!(value, Value::Function(_) | Value::Builtin(_)),
        }
    }
}

/// A default value that can be written in a `static` descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DefaultValue {
    None,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    EmptyList,
    EmptyTuple,
    EmptyDict,
}

impl DefaultValue {
    /// Materialize the default. Fresh lists and dicts belong to `mutability`.
    pub fn to_value(self, mutability: &Mutability) -> Value {
        match self {
            DefaultValue::None => Value::None,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(n) => Value::int(n),
            DefaultValue::Str(s) => Value::string(s),
            DefaultValue::EmptyList => Value::list(Vec::new(), mutability),
            DefaultValue::EmptyTuple => Value::tuple(Vec::new()),
            DefaultValue::EmptyDict => Value::empty_dict(mutability),
        }
    }

    fn render(self) -> String {
        match self {
            DefaultValue::None => "None".into(),
            DefaultValue::Bool(true) => "True".into(),
            DefaultValue::Bool(false) => "False".into(),
            DefaultValue::Int(n) => n.to_string(),
            DefaultValue::Str(s) => format!("{s:?}"),
            DefaultValue::EmptyList => "[]".into(),
            DefaultValue::EmptyTuple => "()".into(),
            DefaultValue::EmptyDict => "{}".into(),
        }
    }
}

/// How a feature flag enables a parameter or method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GatePolarity {
    /// Enabled only while the flag is on.
    Experimental,
    /// Enabled only while the flag is off.
    Deprecated,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlagGate {
    pub flag: &'static str,
    pub polarity: GatePolarity,
}

impl FlagGate {
    pub const fn experimental(flag: &'static str) -> Self {
        FlagGate {
            flag,
            polarity: GatePolarity::Experimental,
        }
    }

    pub const fn deprecated(flag: &'static str) -> Self {
        FlagGate {
            flag,
            polarity: GatePolarity::Deprecated,
        }
    }

    pub fn is_enabled(self, semantics: &Semantics) -> bool {
        let on = semantics.flag(self.flag);
        match self.polarity {
            GatePolarity::Experimental => on,
            GatePolarity::Deprecated => !on,
        }
    }
}

/// One declared parameter of a host method.
///
/// Built with `const` constructors so descriptor tables can be `static`:
///
/// ```text
/// ParamDescriptor::positional("sep", ParamType::String).with_default(DefaultValue::Str(" "))
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub ty: ParamType,
    pub positional: bool,
    pub named: bool,
    pub default: Option<DefaultValue>,
    pub noneable: bool,
    pub gate: Option<FlagGate>,
    /// Value bound while the gate disables the parameter.
    pub disabled_value: DefaultValue,
}

impl ParamDescriptor {
    /// Accepted by position only.
    pub const fn positional(name: &'static str, ty: ParamType) -> Self {
        ParamDescriptor {
            name,
            ty,
            positional: true,
            named: false,
            default: None,
            noneable: false,
            gate: None,
            disabled_value: DefaultValue::None,
        }
    }

    /// Accepted by keyword only.
    pub const fn named(name: &'static str, ty: ParamType) -> Self {
        ParamDescriptor {
            positional: false,
            named: true,
            ..ParamDescriptor::positional(name, ty)
        }
    }

    /// Accepted by position or keyword.
    pub const fn either(name: &'static str, ty: ParamType) -> Self {
        ParamDescriptor {
            named: true,
            ..ParamDescriptor::positional(name, ty)
        }
    }

    pub const fn with_default(self, default: DefaultValue) -> Self {
        ParamDescriptor {
            default: Some(default),
            ..self
        }
    }

    pub const fn noneable(self) -> Self {
        ParamDescriptor {
            noneable: true,
            ..self
        }
    }

    /// Gate the parameter; while disabled it is bound to `disabled_value`.
    pub const fn gated(self, gate: FlagGate, disabled_value: DefaultValue) -> Self {
        ParamDescriptor {
            gate: Some(gate),
            disabled_value,
            ..self
        }
    }

    fn render(&self) -> String {
        match self.default {
            Some(default) => format!("{} = {}", self.name, default.render()),
            None => self.name.to_string(),
        }
    }
}

bitflags! {
    /// Interpreter-supplied arguments a method asks for, in the order they
    /// are handed over.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Extras: u8 {
        const LOCATION = 1 << 0;
        const CALL_EXPR = 1 << 1;
        const THREAD = 1 << 2;
        const SEMANTICS = 1 << 3;
    }
}

/// A host method, global function or struct field.
pub struct MethodDescriptor {
    /// Name visible to scripts.
    pub name: &'static str,
    /// Name of the implementing member; orders table construction.
    pub member: &'static str,
    /// Read as `x.name` without a call.
    pub struct_field: bool,
    /// Invoked when the receiver itself is called.
    pub self_call: bool,
    pub params: &'static [ParamDescriptor],
    /// Accepts surplus positional arguments as a tuple (`*args`).
    pub extra_positional: bool,
    /// Accepts surplus keyword arguments as a dict (`**kwargs`).
    pub extra_keyword: bool,
    pub extras: Extras,
    /// Whole-method gate; a disabled method is absent from the table.
    pub gate: Option<FlagGate>,
    pub imp: BuiltinImpl,
}

impl MethodDescriptor {
    /// A plain method with the given parameters and no extras.
    pub const fn new(
        name: &'static str,
        member: &'static str,
        params: &'static [ParamDescriptor],
        imp: BuiltinImpl,
    ) -> Self {
        MethodDescriptor {
            name,
            member,
            struct_field: false,
            self_call: false,
            params,
            extra_positional: false,
            extra_keyword: false,
            extras: Extras::empty(),
            gate: None,
            imp,
        }
    }

    pub const fn with_extras(self, extras: Extras) -> Self {
        MethodDescriptor { extras, ..self }
    }

    pub const fn with_varargs(self) -> Self {
        MethodDescriptor {
            extra_positional: true,
            ..self
        }
    }

    pub const fn with_kwargs(self) -> Self {
        MethodDescriptor {
            extra_keyword: true,
            ..self
        }
    }

    pub const fn gated(self, gate: FlagGate) -> Self {
        MethodDescriptor {
            gate: Some(gate),
            ..self
        }
    }

    pub const fn struct_field(self) -> Self {
        MethodDescriptor {
            struct_field: true,
            ..self
        }
    }

    pub const fn self_call(self) -> Self {
        MethodDescriptor {
            self_call: true,
            ..self
        }
    }

    /// `function len(x)` or `method get(key, default = None) of 'dict'`.
    pub fn render(&self, receiver: TypeTag) -> String {
        let mut params = String::new();
        let mut first = true;
        let mut sep = |out: &mut String| {
            if !first {
                out.push_str(", ");
            }
            first = false;
        };
        for param in self.params {
            sep(&mut params);
            params.push_str(&param.render());
        }
        if self.extra_positional {
            sep(&mut params);
            params.push_str("*args");
        }
        if self.extra_keyword {
            sep(&mut params);
            params.push_str("**kwargs");
        }
        let mut out = String::new();
        if receiver == TypeTag::Universe {
            let _ = write!(out, "function {}({params})", self.name);
        } else {
            let _ = write!(out, "method {}({params}) of '{}'", self.name, receiver.name());
        }
        out
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("member", &self.member)
            .field("struct_field", &self.struct_field)
            .field("self_call", &self.self_call)
            .finish_non_exhaustive()
    }
}

/// Invalid set of descriptors for one type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("type '{type_name}' has more than one self-call method: '{first}' and '{second}'")]
    DuplicateSelfCall {
        type_name: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("type '{type_name}' has two struct fields named '{name}': '{first}' and '{second}'")]
    DuplicateStructField {
        type_name: &'static str,
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
    #[error("type '{type_name}' has two methods named '{name}': '{first}' and '{second}'")]
    DuplicateMethod {
        type_name: &'static str,
        name: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

/// All descriptors registered by the host, per type.
#[derive(Default)]
pub struct MethodRegistry {
    methods: FxHashMap<TypeTag, Vec<&'static MethodDescriptor>>,
}

impl MethodRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        MethodRegistry::default()
    }

    /// A registry holding the built-in library.
    pub fn builtin() -> Self {
        let mut registry = MethodRegistry::new();
        crate::builtins::register(&mut registry);
        registry
    }

    pub fn register(&mut self, tag: TypeTag, descriptor: &'static MethodDescriptor) {
        self.methods.entry(tag).or_default().push(descriptor);
    }

    pub fn register_all(&mut self, tag: TypeTag, descriptors: &'static [MethodDescriptor]) {
        for descriptor in descriptors {
            self.register(tag, descriptor);
        }
    }

    pub fn methods(&self, tag: TypeTag) -> &[&'static MethodDescriptor] {
        self.methods.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Lookup tables for one type under one semantics.
#[derive(Debug, Default)]
pub struct DispatchTable {
    self_call: Option<&'static MethodDescriptor>,
    methods: FxHashMap<&'static str, &'static MethodDescriptor>,
    fields: FxHashMap<&'static str, &'static MethodDescriptor>,
}

impl DispatchTable {
    /// Collect the descriptors of `tag` enabled under `semantics`.
    ///
    /// Descriptors are inserted sorted by member name, so which of two
    /// conflicting descriptors gets reported is deterministic.
    pub fn build(
        tag: TypeTag,
        registry: &MethodRegistry,
        semantics: &Semantics,
    ) -> Result<DispatchTable, DispatchError> {
        let mut enabled: Vec<&'static MethodDescriptor> = registry
            .methods(tag)
            .iter()
            .copied()
            .filter(|d| d.gate.map_or(true, |gate| gate.is_enabled(semantics)))
            .collect();
        enabled.sort_by_key(|d| d.member);

        let type_name = tag.name();
        let mut table = DispatchTable::default();
        for descriptor in enabled {
            if descriptor.self_call {
                if let Some(previous) = table.self_call {
                    return Err(DispatchError::DuplicateSelfCall {
                        type_name,
                        first: previous.member,
                        second: descriptor.member,
                    });
                }
                table.self_call = Some(descriptor);
                continue;
            }
            if descriptor.struct_field {
                if let Some(previous) = table.fields.insert(descriptor.name, descriptor) {
                    return Err(DispatchError::DuplicateStructField {
                        type_name,
                        name: descriptor.name,
                        first: previous.member,
                        second: descriptor.member,
                    });
                }
            }
            if let Some(previous) = table.methods.insert(descriptor.name, descriptor) {
                return Err(DispatchError::DuplicateMethod {
                    type_name,
                    name: descriptor.name,
                    first: previous.member,
                    second: descriptor.member,
                });
            }
        }
        Ok(table)
    }

    pub fn self_call(&self) -> Option<&'static MethodDescriptor> {
        self.self_call
    }

    /// Method or field by exposed name.
    pub fn get(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.methods.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&'static MethodDescriptor> {
        self.fields.get(name).copied()
    }

    /// Exposed names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests;
