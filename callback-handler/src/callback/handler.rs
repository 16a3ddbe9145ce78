//! The callback handler: validate once, store, invoke many times.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use super::metadata::{Metadata, Priority};
use super::target::{BoundMethod, Callback, Resolved, Target};
use crate::callable::{Args, CallResult, Callable, dispatch};
use crate::error::{CallbackError, Result};
use crate::reflect::{
    Method, Reflection, StaticReference, TypeRegistry, resolve_static_reference,
};

/// A validated callback together with its metadata.
///
/// Object-owning targets ([`Callback::Object`] and
/// [`Callback::BoundMethod`]) are held through a [`Weak`](std::sync::Weak)
/// reference: the handler never keeps the owner alive, and calls made after
/// the owner is dropped fail with [`CallbackError::TargetExpired`].
#[derive(Clone)]
pub struct CallbackHandler {
    target: Target,
    metadata: Metadata,
    reflection: Arc<dyn Reflection>,
}

impl CallbackHandler {
    /// Create a handler that resolves names against an empty registry.
    ///
    /// Only closures and invocable objects can be registered this way.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidCallback`] if the callback is not
    /// callable.
    pub fn new(callback: Callback, metadata: Metadata) -> Result<Self> {
        Self::with_reflection(callback, metadata, Arc::new(TypeRegistry::new()))
    }

    /// Create a handler that resolves names through `reflection`.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidCallback`] if the callback is not
    /// callable right now, including when the lookup itself panics. A
    /// panicking lookup is still reported by the installed panic hook.
    pub fn with_reflection(
        callback: Callback,
        metadata: Metadata,
        reflection: Arc<dyn Reflection>,
    ) -> Result<Self> {
        let target = register(callback, reflection.as_ref())?;

        debug!(
            kind = target.kind(),
            weak = target.is_weak(),
            metadata = metadata.len(),
            "registered callback"
        );

        Ok(Self {
            target,
            metadata,
            reflection,
        })
    }

    /// Get the currently invocable target.
    ///
    /// Weakly-held owners are upgraded for the lifetime of the returned value.
    #[must_use]
    pub fn resolve(&self) -> Resolved<'_> {
        match &self.target {
            Target::Function(function) => Resolved::Function(function),
            Target::Object(owner) => owner.upgrade().map_or(Resolved::Expired, Resolved::Object),
            Target::BoundMethod {
                owner,
                name,
                method,
            } => owner.upgrade().map_or(Resolved::Expired, |owner| {
                Resolved::BoundMethod(BoundMethod::new(owner, name.clone(), method.clone()))
            }),
            Target::StaticMethod(reference) => Resolved::StaticMethod(reference),
        }
    }

    /// Invoke the target with `args`, in order.
    ///
    /// # Errors
    ///
    /// - [`CallbackError::TargetExpired`] if the owner was dropped
    /// - [`CallbackError::InvalidStaticReference`] if a `Type::method`
    ///   reference no longer names a static method
    /// - [`CallbackError::Target`] carrying exactly what the target returned
    pub fn invoke(&self, args: Args) -> Result<Value> {
        trace!(kind = self.target.kind(), args = args.len(), "invoking callback");

        let result = match self.resolve() {
            Resolved::Expired => return Err(CallbackError::TargetExpired),
            Resolved::Function(function) => dispatch(function, args),
            Resolved::Object(owner) => dispatch(owner.as_ref(), args),
            Resolved::BoundMethod(method) => dispatch(&method, args),
            Resolved::StaticMethod(reference) => {
                let function = resolve_static_reference(reference, self.reflection.as_ref())?;
                dispatch(&function, args)
            }
        };

        result.map_err(CallbackError::Target)
    }

    /// Check if the target can still be called.
    ///
    /// Always true for targets that own nothing.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.target {
            Target::Object(owner) => owner.strong_count() > 0,
            Target::BoundMethod { owner, .. } => owner.strong_count() > 0,
            Target::Function(_) | Target::StaticMethod(_) => true,
        }
    }

    /// Whether the target's owner is held weakly.
    #[must_use]
    pub const fn holds_weak_reference(&self) -> bool {
        self.target.is_weak()
    }

    /// Get all metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get a single metadatum.
    #[must_use]
    pub fn metadatum(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// The priority stored in metadata, [`Priority::NORMAL`] if none.
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.metadata.priority()
    }
}

impl Callable for CallbackHandler {
    fn call_args(&self, args: Args) -> CallResult {
        self.invoke(args)
            .map_err(|err| err.into_target_error().unwrap_or_else(Into::into))
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("kind", &self.target.kind())
            .field("alive", &self.is_alive())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Check that `callback` is callable and convert it to its stored form.
///
/// Panics raised by the reflection oracle are turned into
/// [`CallbackError::InvalidCallback`]. The process panic hook still runs, so
/// the default hook prints the panic to stderr. The hook is global and is left
/// to the application.
fn register(callback: Callback, reflection: &dyn Reflection) -> Result<Target> {
    panic::catch_unwind(AssertUnwindSafe(|| probe(callback, reflection))).unwrap_or_else(
        |payload| {
            Err(CallbackError::invalid_callback(format!(
                "callable check panicked: {}",
                panic_message(payload.as_ref())
            )))
        },
    )
}

fn probe(callback: Callback, reflection: &dyn Reflection) -> Result<Target> {
    match callback {
        Callback::Function(function) => Ok(Target::Function(function)),
        Callback::Object(owner) => Ok(Target::Object(Arc::downgrade(&owner))),
        Callback::BoundMethod { owner, method } => {
            let receiver = (*owner).type_id();
            let type_name = reflection.type_name_of(receiver).ok_or_else(|| {
                CallbackError::invalid_callback(format!(
                    "receiver of method `{method}` is not a registered type"
                ))
            })?;
            let resolved = reflection.method(&type_name, &method).ok_or_else(|| {
                CallbackError::invalid_callback(format!(
                    "type `{type_name}` has no method `{method}`"
                ))
            })?;
            if let Method::Instance(instance) = &resolved
                && instance.receiver() != receiver
            {
                return Err(CallbackError::invalid_callback(format!(
                    "method `{type_name}::{method}` does not take this receiver"
                )));
            }
            Ok(Target::BoundMethod {
                owner: Arc::downgrade(&owner),
                name: method,
                method: resolved,
            })
        }
        Callback::StaticMethod(reference) => {
            // Staticness is only enforced at call time.
            let known = match StaticReference::parse(&reference) {
                StaticReference::Function(name) => reflection.function(name).is_some(),
                StaticReference::Method { type_name, method } => {
                    reflection.method(type_name, method).is_some()
                }
            };
            if known {
                Ok(Target::StaticMethod(reference))
            } else {
                Err(CallbackError::invalid_callback(format!(
                    "`{reference}` does not name a function or method"
                )))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
