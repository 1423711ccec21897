//! Function signatures in canonical parameter order.
//!
//! Declared parameters are normalized into one layout that both argument
//! binders rely on:
//!
//! ```text
//! mandatory positional | optional positional | optional named-only |
//! mandatory named-only | *args | **kwargs
//! ```
//!
//! Mandatory named-only parameters come after the optional ones so that all
//! optional slots (positional or named-only) form one contiguous range, and
//! the defaults list lines up with it.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use lark_ir::{Name, Parameter};
use rustc_hash::FxHashSet;

use crate::value::Value;

/// A parameter as declared, without its default expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamShape {
    Mandatory(Name),
    Optional(Name),
    /// `*args`, or a bare `*` when `None`.
    Star(Option<Name>),
    StarStar(Name),
}

impl ParamShape {
    fn name(&self) -> Option<&Name> {
        match self {
            ParamShape::Mandatory(n) | ParamShape::Optional(n) | ParamShape::StarStar(n) => Some(n),
            ParamShape::Star(n) => n.as_ref(),
        }
    }
}

impl From<&Parameter> for ParamShape {
    fn from(param: &Parameter) -> Self {
        match param {
            Parameter::Mandatory(n) => ParamShape::Mandatory(n.clone()),
            Parameter::Optional(n, _) => ParamShape::Optional(n.clone()),
            Parameter::Star(n) => ParamShape::Star(n.clone()),
            Parameter::StarStar(n) => ParamShape::StarStar(n.clone()),
        }
    }
}

impl fmt::Display for ParamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamShape::Mandatory(n) => write!(f, "{n}"),
            ParamShape::Optional(n) => write!(f, "{n} = ?"),
            ParamShape::Star(Some(n)) => write!(f, "*{n}"),
            ParamShape::Star(None) => write!(f, "*"),
            ParamShape::StarStar(n) => write!(f, "**{n}"),
        }
    }
}

/// Invalid parameter list. Each variant names the offending parameter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(Name),
    #[error("required parameter {0} may not follow an optional parameter")]
    MandatoryAfterOptional(Name),
    #[error("parameter {0} may not follow **kwargs")]
    ParameterAfterStarStar(String),
    #[error("multiple * parameters are not allowed: {0}")]
    DuplicateStar(String),
    #[error("multiple ** parameters are not allowed: **{0}")]
    DuplicateStarStar(Name),
    #[error("invalid parameter: '{0}'")]
    Parse(String),
}

/// Canonical parameter shape of a callable. The default takes no parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionSignature {
    mandatory_positional: usize,
    optional_positional: usize,
    mandatory_named_only: usize,
    optional_named_only: usize,
    has_star: bool,
    has_star_star: bool,
    /// Parameter names in canonical order.
    names: Vec<Name>,
    /// Parameters in declaration order, for rendering.
    declared: Vec<ParamShape>,
}

impl FunctionSignature {
    /// Normalize declared parameters.
    pub fn new(declared: Vec<ParamShape>) -> Result<Self, SignatureError> {
        let mut seen = FxHashSet::default();
        let mut mandatory_positional = Vec::new();
        let mut optional_positional = Vec::new();
        let mut mandatory_named = Vec::new();
        let mut optional_named = Vec::new();
        let mut star: Option<Option<Name>> = None;
        let mut star_star: Option<Name> = None;

        for param in &declared {
            if let Some(name) = param.name() {
                if !seen.insert(name.clone()) {
                    return Err(SignatureError::DuplicateParameter(name.clone()));
                }
            }
            if star_star.is_some() {
                return Err(match param {
                    ParamShape::StarStar(name) => SignatureError::DuplicateStarStar(name.clone()),
                    other => SignatureError::ParameterAfterStarStar(other.to_string()),
                });
            }
            match param {
                ParamShape::Mandatory(name) => {
                    if star.is_some() {
                        mandatory_named.push(name.clone());
                    } else if !optional_positional.is_empty() {
                        return Err(SignatureError::MandatoryAfterOptional(name.clone()));
                    } else {
                        mandatory_positional.push(name.clone());
                    }
                }
                ParamShape::Optional(name) => {
                    if star.is_some() {
                        optional_named.push(name.clone());
                    } else {
                        optional_positional.push(name.clone());
                    }
                }
                ParamShape::Star(name) => {
                    if star.is_some() {
                        return Err(SignatureError::DuplicateStar(param.to_string()));
                    }
                    star = Some(name.clone());
                }
                ParamShape::StarStar(name) => star_star = Some(name.clone()),
            }
        }

        let has_star = matches!(star, Some(Some(_)));
        let sig = FunctionSignature {
            mandatory_positional: mandatory_positional.len(),
            optional_positional: optional_positional.len(),
            mandatory_named_only: mandatory_named.len(),
            optional_named_only: optional_named.len(),
            has_star,
            has_star_star: star_star.is_some(),
            names: mandatory_positional
                .into_iter()
                .chain(optional_positional)
                .chain(optional_named)
                .chain(mandatory_named)
                .chain(star.flatten())
                .chain(star_star)
                .collect(),
            declared,
        };
        debug_assert_eq!(
            sig.names.len(),
            [
                sig.num_positional(),
                sig.num_named_only(),
                usize::from(sig.has_star),
                usize::from(sig.has_star_star),
            ]
            .iter()
            .sum::<usize>()
        );
        Ok(sig)
    }

    /// Signature of a `def` statement.
    pub fn from_parameters(params: &[Parameter]) -> Result<Self, SignatureError> {
        FunctionSignature::new(params.iter().map(ParamShape::from).collect())
    }

    pub fn num_mandatory_positional(&self) -> usize {
        self.mandatory_positional
    }

    pub fn num_optional_positional(&self) -> usize {
        self.optional_positional
    }

    pub fn num_mandatory_named_only(&self) -> usize {
        self.mandatory_named_only
    }

    pub fn num_optional_named_only(&self) -> usize {
        self.optional_named_only
    }

    pub fn has_star(&self) -> bool {
        self.has_star
    }

    pub fn has_star_star(&self) -> bool {
        self.has_star_star
    }

    pub fn num_positional(&self) -> usize {
        self.mandatory_positional.saturating_add(self.optional_positional)
    }

    pub fn num_named_only(&self) -> usize {
        self.mandatory_named_only.saturating_add(self.optional_named_only)
    }

    /// Number of optional slots, i.e. the expected length of the defaults.
    pub fn num_optionals(&self) -> usize {
        self.optional_positional.saturating_add(self.optional_named_only)
    }

    pub fn num_parameters(&self) -> usize {
        self.names.len()
    }

    /// Names in canonical order.
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn declared(&self) -> &[ParamShape] {
        &self.declared
    }

    /// `name(params)`. With `defaults`, optional parameters show their
    /// default value instead of `?`.
    pub fn render(&self, name: &str, defaults: Option<&[Value]>) -> String {
        let mut out = String::new();
        out.push_str(name);
        out.push('(');
        for (i, param) in self.declared.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match (param, defaults) {
                (ParamShape::Optional(param_name), Some(defaults)) => {
                    let default = self
                        .names
                        .iter()
                        .position(|n| n == param_name)
                        .and_then(|pos| pos.checked_sub(self.mandatory_positional))
                        .and_then(|pos| defaults.get(pos));
                    match default {
                        Some(value) => {
                            let _ = write!(out, "{param_name} = {}", value.repr());
                        }
                        None => {
                            let _ = write!(out, "{param}");
                        }
                    }
                }
                _ => {
                    let _ = write!(out, "{param}");
                }
            }
        }
        out.push(')');
        out
    }
}

/// Renders the parameter list in declaration order, e.g. `a, b = ?, *c`.
impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.declared.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

/// Parses the output of `Display`. Default values are not evaluated; any
/// text after `=` marks the parameter optional.
impl FromStr for FunctionSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, SignatureError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return FunctionSignature::new(Vec::new());
        }
        let mut params = Vec::new();
        for token in trimmed.split(',') {
            let token = token.trim();
            let param = if let Some(rest) = token.strip_prefix("**") {
                ParamShape::StarStar(identifier(rest, token)?)
            } else if let Some(rest) = token.strip_prefix('*') {
                if rest.trim().is_empty() {
                    ParamShape::Star(None)
                } else {
                    ParamShape::Star(Some(identifier(rest, token)?))
                }
            } else if let Some((name, _default)) = token.split_once('=') {
                ParamShape::Optional(identifier(name, token)?)
            } else {
                ParamShape::Mandatory(identifier(token, token)?)
            };
            params.push(param);
        }
        FunctionSignature::new(params)
    }
}

fn identifier(text: &str, token: &str) -> Result<Name, SignatureError> {
    let text = text.trim();
    let valid = text
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && text.chars().all(|c| c.is_alphanumeric() || c == '_');
    if valid {
        Ok(Name::from(text))
    } else {
        Err(SignatureError::Parse(token.to_string()))
    }
}
