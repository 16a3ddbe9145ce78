//! Re-exports for the common case.

pub use crate::callable::{Args, CallResult, Callable, Function};
pub use crate::callback::{Callback, CallbackHandler, Metadata, Priority, Resolved};
pub use crate::error::{BoxError, CallbackError, StaticReferenceError};
pub use crate::reflect::{Reflect, Reflection, TypeInfo, TypeRegistry};
pub use serde_json::{Value, json};

#[cfg(feature = "derive")]
pub use callback_handler_derive::reflect;
