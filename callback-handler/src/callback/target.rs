//! The forms a deferred call can take, before and after registration.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::callable::{Args, CallResult, Callable, Function};
use crate::reflect::{Method, SEPARATOR};

/// A callback as supplied by the caller.
#[derive(Clone)]
pub enum Callback {
    /// A closure or function pointer. Held strongly.
    Function(Function),
    /// An invocable object. Held weakly once registered.
    Object(Arc<dyn Callable>),
    /// A named method on an object instance. The owner is held weakly once
    /// registered.
    BoundMethod {
        /// The receiver.
        owner: Arc<dyn Any + Send + Sync>,
        /// Method name, looked up through reflection.
        method: String,
    },
    /// A `Type::method` reference or a free function name, resolved by name
    /// on every call.
    StaticMethod(String),
}

impl Callback {
    /// Wrap a closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Args) -> CallResult + Send + Sync + 'static,
    {
        Self::Function(Function::new(f))
    }

    /// Wrap an invocable object without taking ownership of it.
    pub fn object<T: Callable + 'static>(owner: &Arc<T>) -> Self {
        Self::Object(Arc::clone(owner) as Arc<dyn Callable>)
    }

    /// Name a method on `owner`.
    pub fn bound<T: Any + Send + Sync>(owner: &Arc<T>, method: impl Into<String>) -> Self {
        Self::BoundMethod {
            owner: Arc::clone(owner) as Arc<dyn Any + Send + Sync>,
            method: method.into(),
        }
    }

    /// Name a static method, or a free function when `method` is empty.
    pub fn static_method(type_name: &str, method: &str) -> Self {
        if method.is_empty() {
            Self::StaticMethod(type_name.to_string())
        } else {
            Self::StaticMethod(format!("{type_name}{SEPARATOR}{method}"))
        }
    }

    /// Use a raw string reference as is.
    pub fn reference(reference: impl Into<String>) -> Self {
        Self::StaticMethod(reference.into())
    }

    /// Short name of the form, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::Object(_) => "object",
            Self::BoundMethod { .. } => "bound_method",
            Self::StaticMethod(_) => "static_method",
        }
    }
}

impl From<Function> for Callback {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function"),
            Self::Object(_) => f.write_str("Object"),
            Self::BoundMethod { method, .. } => {
                f.debug_struct("BoundMethod").field("method", method).finish_non_exhaustive()
            }
            Self::StaticMethod(reference) => f.debug_tuple("StaticMethod").field(reference).finish(),
        }
    }
}

/// What a handler keeps after registration.
#[derive(Clone)]
pub(crate) enum Target {
    Function(Function),
    Object(Weak<dyn Callable>),
    BoundMethod {
        owner: Weak<dyn Any + Send + Sync>,
        name: String,
        method: Method,
    },
    StaticMethod(String),
}

impl Target {
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::Object(_) => "object",
            Self::BoundMethod { .. } => "bound_method",
            Self::StaticMethod(_) => "static_method",
        }
    }

    pub(crate) const fn is_weak(&self) -> bool {
        matches!(self, Self::Object(_) | Self::BoundMethod { .. })
    }
}

/// A bound method whose owner is pinned for as long as this value lives.
#[derive(Clone)]
pub struct BoundMethod {
    owner: Arc<dyn Any + Send + Sync>,
    name: String,
    method: Method,
}

impl BoundMethod {
    pub(crate) fn new(owner: Arc<dyn Any + Send + Sync>, name: String, method: Method) -> Self {
        Self {
            owner,
            name,
            method,
        }
    }

    /// The live receiver.
    #[must_use]
    pub const fn owner(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.owner
    }

    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Callable for BoundMethod {
    fn call_args(&self, args: Args) -> CallResult {
        match &self.method {
            Method::Instance(method) => method.call(self.owner.as_ref(), args),
            // Static methods reached through an instance ignore the receiver.
            Method::Static(function) => function.call_args(args),
        }
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("name", &self.name)
            .field("kind", &self.method.kind())
            .finish_non_exhaustive()
    }
}

/// A handler's target resolved for one call.
pub enum Resolved<'a> {
    /// A free function.
    Function(&'a Function),
    /// A live invocable object.
    Object(Arc<dyn Callable>),
    /// A live bound method.
    BoundMethod(BoundMethod),
    /// A string reference, still to be validated and looked up.
    StaticMethod(&'a str),
    /// The weakly-held owner is gone.
    Expired,
}

impl Resolved<'_> {
    /// Check if the owner is gone.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl fmt::Debug for Resolved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Function"),
            Self::Object(_) => f.write_str("Object"),
            Self::BoundMethod(method) => f.debug_tuple("BoundMethod").field(method).finish(),
            Self::StaticMethod(reference) => f.debug_tuple("StaticMethod").field(reference).finish(),
            Self::Expired => f.write_str("Expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    #[test]
    fn test_static_method_formatting() {
        assert!(matches!(
            Callback::static_method("Widget", "create"),
            Callback::StaticMethod(ref r) if r == "Widget::create"
        ));
        assert!(matches!(
            Callback::static_method("trim", ""),
            Callback::StaticMethod(ref r) if r == "trim"
        ));
    }

    #[test]
    fn test_bound_shares_owner() {
        let owner = Arc::new(Widget);
        let callback = Callback::bound(&owner, "render");
        assert_eq!(callback.kind(), "bound_method");
        assert_eq!(Arc::strong_count(&owner), 2);
        drop(callback);
        assert_eq!(Arc::strong_count(&owner), 1);
    }
}
