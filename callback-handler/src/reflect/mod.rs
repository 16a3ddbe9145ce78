//! Type and method lookup used to resolve callbacks by name.
//!
//! A [`Reflection`] implementation is a read-only oracle answering three
//! questions about a named type: does it exist, does it have a given method,
//! and is that method static. [`TypeRegistry`] is the thread-safe
//! implementation shipped with this crate; tests and embedders are free to
//! provide their own.
//!
//! Types describe themselves through [`TypeInfo`], either by hand with
//! [`TypeInfo::builder`] or by implementing [`Reflect`] (derivable with the
//! `#[reflect]` attribute when the `derive` feature is enabled).

mod registry;
mod static_ref;

pub use registry::TypeRegistry;
pub use static_ref::{
    SEPARATOR, StaticReference, resolve_static_reference, validate_static_reference,
};

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::callable::{Args, CallResult, Function};
use crate::error::BoxError;

/// Read-only lookup facility consulted when a callback names its target.
pub trait Reflection: Send + Sync {
    /// Whether a type with this name is known.
    fn has_type(&self, type_name: &str) -> bool;

    /// Look up a method on a named type.
    fn method(&self, type_name: &str, method: &str) -> Option<Method>;

    /// The registered name of a concrete Rust type, if any.
    fn type_name_of(&self, type_id: TypeId) -> Option<String>;

    /// Look up a free function by name.
    fn function(&self, name: &str) -> Option<Function>;
}

/// A type that can describe its own methods.
pub trait Reflect: Any + Send + Sync + Sized {
    /// Build the reflection entry for this type.
    fn type_info() -> TypeInfo;
}

/// Whether a method needs an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Type-level method, callable without an instance.
    Static,
    /// Method that requires a receiver.
    Instance,
}

/// Type alias for an instance method erased over its receiver type.
type InstanceFn = dyn Fn(&(dyn Any + Send + Sync), Args) -> CallResult + Send + Sync;

/// A method that is called on a receiver.
#[derive(Clone)]
pub struct InstanceMethod {
    receiver: TypeId,
    f: Arc<InstanceFn>,
}

impl InstanceMethod {
    /// Wrap a method taking `&T`.
    pub fn new<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, Args) -> CallResult + Send + Sync + 'static,
    {
        let f = move |owner: &(dyn Any + Send + Sync), args: Args| -> CallResult {
            let this = owner.downcast_ref::<T>().ok_or_else(|| -> BoxError {
                format!("receiver is not a `{}`", std::any::type_name::<T>()).into()
            })?;
            f(this, args)
        };
        Self {
            receiver: TypeId::of::<T>(),
            f: Arc::new(f),
        }
    }

    /// The Rust type the method expects as its receiver.
    #[must_use]
    pub const fn receiver(&self) -> TypeId {
        self.receiver
    }

    /// Call the method on `owner`.
    ///
    /// # Errors
    ///
    /// Returns the method's own error, or a receiver mismatch error when
    /// `owner` is not the type the method was registered for.
    pub fn call(&self, owner: &(dyn Any + Send + Sync), args: Args) -> CallResult {
        (self.f)(owner, args)
    }
}

impl fmt::Debug for InstanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceMethod").finish_non_exhaustive()
    }
}

/// A method found through reflection.
#[derive(Debug, Clone)]
pub enum Method {
    /// Type-level method.
    Static(Function),
    /// Method bound to a receiver at call time.
    Instance(InstanceMethod),
}

impl Method {
    /// Whether this method needs an instance.
    #[must_use]
    pub const fn kind(&self) -> MethodKind {
        match self {
            Self::Static(_) => MethodKind::Static,
            Self::Instance(_) => MethodKind::Instance,
        }
    }

    /// Check if this is a type-level method.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Reflection entry for one type.
#[derive(Clone)]
pub struct TypeInfo {
    name: String,
    type_id: TypeId,
    methods: HashMap<String, Method>,
}

impl TypeInfo {
    /// Start describing the Rust type `T` under `name`.
    #[must_use]
    pub fn builder<T: Any + Send + Sync>(name: impl Into<String>) -> TypeInfoBuilder<T> {
        TypeInfoBuilder {
            name: name.into(),
            methods: HashMap::new(),
            _type: PhantomData,
        }
    }

    /// The name the type is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The described Rust type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Look up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Check if the type has a method with this name.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Names of all methods, in no particular order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.iter().map(|(k, m)| (k, m.kind())).collect();
        methods.sort_by(|a, b| a.0.cmp(b.0));
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("methods", &methods)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeInfo`].
#[derive(Debug)]
pub struct TypeInfoBuilder<T> {
    name: String,
    methods: HashMap<String, Method>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeInfoBuilder<T> {
    /// Add a type-level method.
    #[must_use]
    pub fn static_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Args) -> CallResult + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Method::Static(Function::new(f)));
        self
    }

    /// Add a method that takes `&T`.
    #[must_use]
    pub fn instance_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&T, Args) -> CallResult + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Method::Instance(InstanceMethod::new(f)));
        self
    }

    /// Finish the entry.
    #[must_use]
    pub fn build(self) -> TypeInfo {
        TypeInfo {
            name: self.name,
            type_id: TypeId::of::<T>(),
            methods: self.methods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    struct Greeter {
        greeting: String,
    }

    fn greeter_info() -> TypeInfo {
        TypeInfo::builder::<Greeter>("Greeter")
            .instance_method("greet", |this: &Greeter, args| {
                Ok(json!(format!("{} {}", this.greeting, args[0].as_str().unwrap_or("?"))))
            })
            .static_method("create", |_| Ok(Value::Null))
            .build()
    }

    #[test]
    fn test_type_info_methods() {
        let info = greeter_info();
        assert_eq!(info.name(), "Greeter");
        assert_eq!(info.type_id(), TypeId::of::<Greeter>());
        assert_eq!(info.method("greet").map(Method::kind), Some(MethodKind::Instance));
        assert!(info.method("create").is_some_and(Method::is_static));
        assert!(!info.has_method("missing"));

        let mut names: Vec<_> = info.method_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["create", "greet"]);
    }

    #[test]
    fn test_instance_method_call() {
        let info = greeter_info();
        let Some(Method::Instance(greet)) = info.method("greet") else {
            panic!("greet should be an instance method");
        };
        let owner = Greeter {
            greeting: "hello".to_string(),
        };
        let out = greet.call(&owner, vec![json!("world")]).expect("call");
        assert_eq!(out, json!("hello world"));
    }

    #[test]
    fn test_instance_method_rejects_wrong_receiver() {
        let method = InstanceMethod::new(|_: &Greeter, _| Ok(Value::Null));
        assert_eq!(method.receiver(), TypeId::of::<Greeter>());
        let err = method.call(&42_u8, Vec::new()).expect_err("wrong receiver");
        assert!(err.to_string().contains("receiver is not"));
    }
}
