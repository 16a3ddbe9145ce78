#![cfg_attr(docsrs, feature(doc_cfg))]
//! Callback handlers for event managers, filter chains and plugin registries.
//!
//! A [`CallbackHandler`] wraps a single deferred call together with
//! immutable [`Metadata`]. The call can be a closure, an invocable object, a
//! named method on an object, or a `Type::method` reference. Targets are
//! checked when the handler is built and object owners are held weakly.
//!
//! ```rust,ignore
//! use callback_handler::prelude::*;
//!
//! let handler = CallbackHandler::new(
//!     Callback::function(|args| Ok(Value::Array(args))),
//!     Metadata::new().with_priority(Priority::HIGH),
//! )?;
//! assert_eq!(handler.invoke(vec![json!(1)])?, json!([1]));
//! ```
extern crate self as callback_handler;

pub mod callable;
pub mod callback;
pub mod error;
pub mod prelude;
pub mod reflect;

pub use callable::{Args, CallResult, Callable, Function};
pub use callback::{Callback, CallbackHandler, Metadata, Priority, Resolved};
pub use error::{BoxError, CallbackError, Result, StaticReferenceError};
pub use reflect::{Reflect, Reflection, TypeInfo, TypeRegistry};

/// Generate a [`Reflect`] implementation from an inherent `impl` block.
///
/// Methods taking `&self` become instance methods, methods without a receiver
/// become static methods. Every reflected method must have the shape
/// `fn(&self, Args) -> CallResult` or `fn(Args) -> CallResult`.
///
/// ```rust,ignore
/// struct Counter { count: AtomicI64 }
///
/// #[reflect(rename_all = "camelCase")]
/// impl Counter {
///     fn current_value(&self, _args: Args) -> CallResult {
///         Ok(json!(self.count.load(Ordering::SeqCst)))
///     }
///
///     fn zero(_args: Args) -> CallResult {
///         Ok(json!(0))
///     }
///
///     #[reflect(skip)]
///     fn helper(&self) {}
/// }
/// // Registers "Counter::currentValue" (instance) and "Counter::zero" (static).
/// ```
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use callback_handler_derive::reflect;
