//! Error types for callback registration and invocation.
//!
//! This module covers every failure a [`CallbackHandler`](crate::CallbackHandler)
//! reports to its caller:
//! - Registration of a target that is not callable
//! - Invocation after a weakly-held owner was dropped
//! - Static references that no longer satisfy the static-call contract
//! - Failures raised by the wrapped target itself

/// Boxed error returned by callback targets.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for callback handler operations.
pub type Result<T> = std::result::Result<T, CallbackError>;

/// The main error type for callback handlers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CallbackError {
    /// The supplied target was not callable when the handler was built.
    #[error("Invalid callback provided; not callable: {reason}")]
    InvalidCallback {
        /// Why the target was rejected.
        reason: String,
    },

    /// The weakly-referenced owner of the target no longer exists.
    #[error("Callback target has expired; its owner was dropped")]
    TargetExpired,

    /// A `Type::method` reference failed validation at call time.
    #[error(transparent)]
    InvalidStaticReference(#[from] StaticReferenceError),

    /// Error raised by the invoked target, passed through untouched.
    #[error(transparent)]
    Target(BoxError),
}

impl CallbackError {
    /// Create an invalid callback error with a reason.
    #[must_use]
    pub fn invalid_callback(reason: impl Into<String>) -> Self {
        Self::InvalidCallback {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the invoked target rather than the handler.
    #[must_use]
    pub const fn is_target_error(&self) -> bool {
        matches!(self, Self::Target(_))
    }

    /// Take back the exact error raised by the target, if that is what this is.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged when the error originated in the handler.
    pub fn into_target_error(self) -> std::result::Result<BoxError, Self> {
        match self {
            Self::Target(err) => Ok(err),
            other => Err(other),
        }
    }
}

/// Reasons a string-form static reference cannot be called.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StaticReferenceError {
    /// The type named before `::` is not known to the registry.
    #[error("Static method call \"{reference}\" refers to a type that does not exist")]
    UnknownType {
        /// The full reference that failed.
        reference: String,
    },

    /// The type exists but has no method with that name.
    #[error("Static method call \"{reference}\" refers to a method that does not exist")]
    UnknownMethod {
        /// The full reference that failed.
        reference: String,
    },

    /// The method exists but requires an instance.
    #[error("Static method call \"{reference}\" refers to a method that is not static")]
    NotStatic {
        /// The full reference that failed.
        reference: String,
    },

    /// A free function name that is no longer registered.
    #[error("Function call \"{reference}\" refers to a function that does not exist")]
    UnknownFunction {
        /// The function name that failed.
        reference: String,
    },
}

impl StaticReferenceError {
    /// The reference text that failed validation.
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::UnknownType { reference }
            | Self::UnknownMethod { reference }
            | Self::NotStatic { reference }
            | Self::UnknownFunction { reference } => reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk quota exceeded")]
    struct QuotaError;

    #[test]
    fn test_target_error_is_transparent() {
        let err = CallbackError::Target(Box::new(QuotaError));
        assert_eq!(err.to_string(), "disk quota exceeded");
        assert!(err.is_target_error());

        let inner = err.into_target_error().expect("target error");
        assert!(inner.downcast_ref::<QuotaError>().is_some());
    }

    #[test]
    fn test_into_target_error_keeps_handler_errors() {
        let err = CallbackError::TargetExpired;
        let back = err.into_target_error().expect_err("not a target error");
        assert!(matches!(back, CallbackError::TargetExpired));
    }

    #[test]
    fn test_static_reference_messages() {
        let err = StaticReferenceError::NotStatic {
            reference: "Counter::get".to_string(),
        };
        assert_eq!(err.reference(), "Counter::get");
        assert_eq!(
            CallbackError::from(err).to_string(),
            "Static method call \"Counter::get\" refers to a method that is not static"
        );
    }
}
