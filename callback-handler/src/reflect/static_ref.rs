//! Parsing and validation of string-form static references.
//!
//! A reference is either a free function name (`"strtoupper"`) or a
//! `Type::method` pair. Only the latter is checked against the static-call
//! contract: the type must exist, it must have the method, and the method must
//! not need an instance.

use super::{Method, Reflection};
use crate::callable::Function;
use crate::error::StaticReferenceError;

/// Separator between a type name and a method name.
pub const SEPARATOR: &str = "::";

/// A parsed string reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticReference<'a> {
    /// A free function name.
    Function(&'a str),
    /// A type-level method.
    Method {
        /// Text before the first separator.
        type_name: &'a str,
        /// Everything after the first separator.
        method: &'a str,
    },
}

impl<'a> StaticReference<'a> {
    /// Split a reference on the first [`SEPARATOR`].
    #[must_use]
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once(SEPARATOR) {
            Some((type_name, method)) => Self::Method { type_name, method },
            None => Self::Function(reference),
        }
    }
}

/// Check that a reference can be called statically.
///
/// Free function names pass without a lookup.
///
/// # Errors
///
/// - [`StaticReferenceError::UnknownType`] if the type is not known
/// - [`StaticReferenceError::UnknownMethod`] if the type lacks the method
/// - [`StaticReferenceError::NotStatic`] if the method needs an instance
pub fn validate_static_reference<'a>(
    reference: &'a str,
    reflection: &dyn Reflection,
) -> Result<StaticReference<'a>, StaticReferenceError> {
    let parsed = StaticReference::parse(reference);
    if let StaticReference::Method { type_name, method } = parsed {
        static_method(reference, type_name, method, reflection)?;
    }
    Ok(parsed)
}

/// Validate a reference and look up the function it names.
///
/// # Errors
///
/// Everything [`validate_static_reference`] reports, plus
/// [`StaticReferenceError::UnknownFunction`] when a free function name is not
/// registered.
pub fn resolve_static_reference(
    reference: &str,
    reflection: &dyn Reflection,
) -> Result<Function, StaticReferenceError> {
    match StaticReference::parse(reference) {
        StaticReference::Function(name) => {
            reflection
                .function(name)
                .ok_or_else(|| StaticReferenceError::UnknownFunction {
                    reference: reference.to_string(),
                })
        }
        StaticReference::Method { type_name, method } => {
            static_method(reference, type_name, method, reflection)
        }
    }
}

fn static_method(
    reference: &str,
    type_name: &str,
    method: &str,
    reflection: &dyn Reflection,
) -> Result<Function, StaticReferenceError> {
    let owned = || reference.to_string();

    if !reflection.has_type(type_name) {
        return Err(StaticReferenceError::UnknownType {
            reference: owned(),
        });
    }

    match reflection.method(type_name, method) {
        None => Err(StaticReferenceError::UnknownMethod {
            reference: owned(),
        }),
        Some(Method::Instance(_)) => Err(StaticReferenceError::NotStatic {
            reference: owned(),
        }),
        Some(Method::Static(function)) => Ok(function),
    }
}
