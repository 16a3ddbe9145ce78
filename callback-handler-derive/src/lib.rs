//! Procedural macros for the callback handler crate.
//!
//! - [`reflect`] - Attribute macro that turns an inherent `impl` block into a
//!   reflection entry, so its methods can be named by callbacks

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

mod reflect;

/// Attribute macro that implements `callback_handler::reflect::Reflect` for
/// the type of an inherent `impl` block.
///
/// # Arguments
///
/// - `name` - Registry name of the type (defaults to the type's identifier)
/// - `rename_all` - Rename methods: `"camelCase"`, `"PascalCase"`,
///   `"snake_case"` or `"kebab-case"`
///
/// Methods taking `&self` are registered as instance methods and methods
/// without a receiver as static methods. Mark helpers with `#[reflect(skip)]`.
///
/// # Example
/// ```rust,ignore
/// #[reflect(name = "Math")]
/// impl Calculator {
///     fn double(args: Args) -> CallResult {
///         Ok(json!(args[0].as_i64().unwrap_or(0) * 2))
///     }
///
///     fn total(&self, _args: Args) -> CallResult {
///         Ok(json!(self.total))
///     }
/// }
/// // "Math::double" is static, "Math::total" needs an instance.
/// ```
#[proc_macro_attribute]
pub fn reflect(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = match reflect::ReflectArgs::parse(args.into()) {
        Ok(args) => args,
        Err(err) => return err.write_errors().into(),
    };
    let item = parse_macro_input!(input as ItemImpl);

    reflect::expand(&args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
