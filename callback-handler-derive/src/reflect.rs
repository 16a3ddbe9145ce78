use convert_case::{Case, Casing};
use darling::FromMeta;
use darling::ast::NestedMeta;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, ImplItem, ImplItemFn, ItemImpl, Type};

const RENAME_RULES: &[&str] = &["camelCase", "PascalCase", "snake_case", "kebab-case"];

/// Arguments accepted by `#[reflect(...)]` on an impl block.
#[derive(Debug, Default, FromMeta)]
pub(crate) struct ReflectArgs {
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    rename_all: Option<String>,
}

impl ReflectArgs {
    pub(crate) fn parse(tokens: TokenStream) -> darling::Result<Self> {
        let items = NestedMeta::parse_meta_list(tokens).map_err(darling::Error::from)?;
        let args = Self::from_list(&items)?;
        if let Some(rule) = &args.rename_all
            && !RENAME_RULES.contains(&rule.as_str())
        {
            return Err(darling::Error::unknown_value(rule));
        }
        Ok(args)
    }

    fn rename(&self, method: &str) -> String {
        match self.rename_all.as_deref() {
            Some("camelCase") => method.to_case(Case::Camel),
            Some("PascalCase") => method.to_case(Case::Pascal),
            Some("snake_case") => method.to_case(Case::Snake),
            Some("kebab-case") => method.to_case(Case::Kebab),
            _ => method.to_string(),
        }
    }
}

/// Which side of the static/instance split a method falls on.
enum Receiver {
    Instance,
    Static,
}

struct Reflected {
    ident: Ident,
    name: String,
    receiver: Receiver,
}

pub(crate) fn expand(args: &ReflectArgs, mut item: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[reflect] only applies to inherent impl blocks",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new(
            item.generics.span(),
            "#[reflect] does not support generic impl blocks",
        ));
    }

    let type_name = match &args.name {
        Some(name) => name.clone(),
        None => type_ident(&item.self_ty)?.unraw().to_string(),
    };

    let mut reflected = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        if take_skip(&mut method.attrs)? {
            continue;
        }
        reflected.push(Reflected {
            ident: method.sig.ident.clone(),
            name: args.rename(&method.sig.ident.unraw().to_string()),
            receiver: classify(method)?,
        });
    }

    let registrations = reflected.iter().map(|method| {
        let ident = &method.ident;
        let name = &method.name;
        match method.receiver {
            Receiver::Instance => quote! {
                .instance_method(#name, |this: &Self, args: ::callback_handler::callable::Args| {
                    Self::#ident(this, args)
                })
            },
            Receiver::Static => quote! {
                .static_method(#name, |args: ::callback_handler::callable::Args| Self::#ident(args))
            },
        }
    });

    let self_ty = &item.self_ty;
    Ok(quote! {
        #item

        impl ::callback_handler::reflect::Reflect for #self_ty {
            fn type_info() -> ::callback_handler::reflect::TypeInfo {
                ::callback_handler::reflect::TypeInfo::builder::<Self>(#type_name)
                    #(#registrations)*
                    .build()
            }
        }
    })
}

fn type_ident(ty: &Type) -> syn::Result<&Ident> {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            if let Some(segment) = path.path.segments.last() {
                return Ok(&segment.ident);
            }
        }
        _ => {}
    }
    Err(syn::Error::new(
        ty.span(),
        "cannot infer a type name; use #[reflect(name = \"...\")]",
    ))
}

/// Remove `#[reflect(skip)]` from a method, reporting whether it was there.
fn take_skip(attrs: &mut Vec<Attribute>) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("reflect")) {
        let flag: Ident = attr.parse_args()?;
        if flag != "skip" {
            return Err(syn::Error::new(flag.span(), "expected `skip`"));
        }
        skip = true;
    }
    attrs.retain(|attr| !attr.path().is_ident("reflect"));
    Ok(skip)
}

fn classify(method: &ImplItemFn) -> syn::Result<Receiver> {
    let sig = &method.sig;
    let (receiver, expected_inputs) = match sig.receiver() {
        Some(receiver) => {
            if receiver.reference.is_none()
                || receiver.mutability.is_some()
                || receiver.colon_token.is_some()
            {
                return Err(syn::Error::new(
                    receiver.span(),
                    "reflected instance methods must take `&self`",
                ));
            }
            (Receiver::Instance, 2)
        }
        None => (Receiver::Static, 1),
    };

    if sig.inputs.len() != expected_inputs {
        return Err(syn::Error::new(
            sig.inputs.span(),
            "reflected methods take a single `Args` parameter; use #[reflect(skip)] for helpers",
        ));
    }
    if sig.asyncness.is_some() || !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.span(),
            "reflected methods must be synchronous and non-generic",
        ));
    }
    Ok(receiver)
}
