//! Callback handlers and the forms of callback they wrap.
//!
//! The [`Callback`] enum is what a caller hands over; [`CallbackHandler`]
//! checks it once, stores it (weakly, when it owns an object) and invokes it
//! on demand. [`Metadata`] travels with each handler for consumers to
//! interpret, e.g. as a [`Priority`].

mod handler;
mod metadata;
mod target;

pub use handler::CallbackHandler;
pub use metadata::{Metadata, PRIORITY_KEY, Priority};
pub use target::{BoundMethod, Callback, Resolved};
