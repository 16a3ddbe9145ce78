//! The invocation contract shared by every callback target.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;

/// Ordered arguments passed to a callback.
pub type Args = Vec<Value>;

/// What a callback target returns.
pub type CallResult = Result<Value, BoxError>;

/// Type alias for a boxed variadic callback function.
pub type CallbackFn = dyn Fn(Args) -> CallResult + Send + Sync;

/// Something that can be called with an argument list.
///
/// Only [`call_args`](Self::call_args) is required. The fixed-arity entry
/// points are what the handler uses for up to three arguments; overriding them
/// must not change which value lands in which position.
pub trait Callable: Send + Sync {
    /// Call with any number of arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the target raises.
    fn call_args(&self, args: Args) -> CallResult;

    /// Call with no arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the target raises.
    fn call0(&self) -> CallResult {
        self.call_args(Vec::new())
    }

    /// Call with one argument.
    ///
    /// # Errors
    ///
    /// Returns whatever error the target raises.
    fn call1(&self, a: Value) -> CallResult {
        self.call_args(vec![a])
    }

    /// Call with two arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the target raises.
    fn call2(&self, a: Value, b: Value) -> CallResult {
        self.call_args(vec![a, b])
    }

    /// Call with three arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the target raises.
    fn call3(&self, a: Value, b: Value, c: Value) -> CallResult {
        self.call_args(vec![a, b, c])
    }
}

/// Route `args` to the fixed-arity entry point matching their count.
pub(crate) fn dispatch(target: &dyn Callable, args: Args) -> CallResult {
    match args.len() {
        0 => target.call0(),
        1 => match <[Value; 1]>::try_from(args) {
            Ok([a]) => target.call1(a),
            Err(args) => target.call_args(args),
        },
        2 => match <[Value; 2]>::try_from(args) {
            Ok([a, b]) => target.call2(a, b),
            Err(args) => target.call_args(args),
        },
        3 => match <[Value; 3]>::try_from(args) {
            Ok([a, b, c]) => target.call3(a, b, c),
            Err(args) => target.call_args(args),
        },
        _ => target.call_args(args),
    }
}

/// A free function target.
#[derive(Clone)]
pub struct Function(Arc<CallbackFn>);

impl Function {
    /// Wrap a closure or function pointer.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Args) -> CallResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Whether two handles point at the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Callable for Function {
    fn call_args(&self, args: Args) -> CallResult {
        (self.0)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records which entry point the dispatcher picked.
    #[derive(Default)]
    struct Recorder {
        entry: Mutex<Vec<&'static str>>,
    }

    impl Recorder {
        fn note(&self, entry: &'static str) {
            self.entry.lock().expect("lock").push(entry);
        }
    }

    impl Callable for Recorder {
        fn call_args(&self, args: Args) -> CallResult {
            self.note("n");
            Ok(Value::Array(args))
        }

        fn call0(&self) -> CallResult {
            self.note("0");
            Ok(json!([]))
        }

        fn call1(&self, a: Value) -> CallResult {
            self.note("1");
            Ok(json!([a]))
        }

        fn call2(&self, a: Value, b: Value) -> CallResult {
            self.note("2");
            Ok(json!([a, b]))
        }

        fn call3(&self, a: Value, b: Value, c: Value) -> CallResult {
            self.note("3");
            Ok(json!([a, b, c]))
        }
    }

    #[test]
    fn test_dispatch_picks_entry_point_by_count() {
        let recorder = Recorder::default();
        for n in [0usize, 1, 2, 3, 7] {
            let args: Args = (0..n).map(|i| json!(i)).collect();
            let out = dispatch(&recorder, args.clone()).expect("call");
            assert_eq!(out, Value::Array(args));
        }
        assert_eq!(
            *recorder.entry.lock().expect("lock"),
            vec!["0", "1", "2", "3", "n"]
        );
    }

    #[test]
    fn test_function_defaults_forward_in_order() {
        let echo = Function::new(|args| Ok(Value::Array(args)));
        assert_eq!(echo.call0().expect("call"), json!([]));
        assert_eq!(echo.call2(json!("a"), json!("b")).expect("call"), json!(["a", "b"]));
        assert_eq!(
            echo.call3(json!(1), json!(2), json!(3)).expect("call"),
            json!([1, 2, 3])
        );
    }

    #[test]
    fn test_function_ptr_eq() {
        let f = Function::new(|_| Ok(Value::Null));
        let g = f.clone();
        let h = Function::new(|_| Ok(Value::Null));
        assert!(f.ptr_eq(&g));
        assert!(!f.ptr_eq(&h));
    }
}
