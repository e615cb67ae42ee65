//! Code generation for the `#[cow_methods]` attribute.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::visit_mut::{self, VisitMut};
use syn::{GenericParam, Ident, ItemImpl, ReturnType, Type};

use crate::parse::{collect_methods, strip_cow_attrs, MacroArgs, Forwarded, Route};

/// Main entry point for code generation.
pub fn expand(args: MacroArgs, mut input: ItemImpl) -> syn::Result<TokenStream> {
    if input.trait_.is_some() {
        return Err(syn::Error::new_spanned(
            &input.self_ty,
            "#[cow_methods] applies to inherent impl blocks, not trait impls",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[cow_methods] does not support generic impl blocks",
        ));
    }

    let trait_ident = match args.trait_name {
        Some(name) => name,
        None => format_ident!("{}Cow", type_ident(&input.self_ty)?),
    };

    let mut methods = collect_methods(&input)?;
    for item in &mut methods {
        // Inside the generated trait `Self` is the cell, not the wrapped type
        ReplaceSelf(&input.self_ty).visit_signature_mut(&mut item.method.sig);
    }
    strip_cow_attrs(&mut input);

    let self_ty = &input.self_ty;
    let declarations = methods.iter().map(declaration);
    let definitions = methods.iter().map(definition);
    let trait_doc = format!(
        "Copy-on-write forwarding methods for `TypedRef<{}>`.",
        quote!(#self_ty).to_string().replace(' ', "")
    );

    Ok(quote! {
        #input

        #[doc = #trait_doc]
        pub trait #trait_ident {
            #(#declarations)*
        }

        impl #trait_ident for ::cowcell::TypedRef<#self_ty> {
            #(#definitions)*
        }
    })
}

/// The last path segment of the self type names the generated trait.
fn type_ident(ty: &Type) -> syn::Result<&Ident> {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| &segment.ident)
            .ok_or_else(|| syn::Error::new_spanned(ty, "expected a named type")),
        _ => Err(syn::Error::new_spanned(
            ty,
            "#[cow_methods] needs a named type; use `trait_name = \"...\"` otherwise",
        )),
    }
}

/// Rewrites bare `Self` types to the concrete self type.
struct ReplaceSelf<'a>(&'a Type);

impl VisitMut for ReplaceSelf<'_> {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        if let Type::Path(path) = ty {
            if path.qself.is_none() && path.path.is_ident("Self") {
                *ty = self.0.clone();
                return;
            }
        }
        visit_mut::visit_type_mut(self, ty);
    }
}

fn arg_idents(item: &Forwarded) -> Vec<Ident> {
    (0..item.arg_types().len())
        .map(|i| format_ident!("__cow_arg{}", i))
        .collect()
}

/// Return type as seen by callers of the forwarding method.
fn forwarded_output(item: &Forwarded) -> TokenStream {
    let output = &item.method.sig.output;
    match (item.route, item.fallible) {
        (Route::Read, _) | (Route::Mutate, true) => quote!(#output),
        (Route::Mutate, false) => match output {
            ReturnType::Default => quote!(-> ::cowcell::Result<()>),
            ReturnType::Type(_, ty) => quote!(-> ::cowcell::Result<#ty>),
        },
    }
}

/// Signature shared by the trait declaration and its implementation.
fn signature(item: &Forwarded) -> TokenStream {
    let sig = &item.method.sig;
    let name = &sig.ident;
    let generics = &sig.generics;
    let where_clause = &sig.generics.where_clause;
    let args = arg_idents(item);
    let types = item.arg_types();
    let output = forwarded_output(item);

    quote! {
        fn #name #generics (&self, #(#args: #types),*) #output #where_clause
    }
}

fn declaration(item: &Forwarded) -> TokenStream {
    let docs = item
        .method
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"));
    let signature = signature(item);

    quote! {
        #(#docs)*
        #signature;
    }
}

fn definition(item: &Forwarded) -> TokenStream {
    let sig = &item.method.sig;
    let name = &sig.ident;
    let args = arg_idents(item);
    let signature = signature(item);

    let type_params: Vec<_> = sig
        .generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(param) => Some(&param.ident),
            GenericParam::Const(param) => Some(&param.ident),
            GenericParam::Lifetime(_) => None,
        })
        .collect();
    let turbofish = if type_params.is_empty() {
        quote!()
    } else {
        quote!(::<#(#type_params),*>)
    };

    let call = quote!(inner.#name #turbofish (#(#args),*));
    let body = match (item.route, item.fallible) {
        (Route::Read, _) => quote!(self.read(|inner| #call)),
        (Route::Mutate, true) => quote!(self.mutate(|inner| #call)),
        (Route::Mutate, false) => {
            quote!(self.mutate(|inner| ::core::result::Result::Ok(#call)))
        }
    };

    quote! {
        #signature {
            #body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_default_trait_name() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                pub fn bump(&mut self) {}
            }
        };

        let tokens = expand(MacroArgs::default(), input).unwrap().to_string();
        assert!(tokens.contains("pub trait CounterCow"));
        assert!(tokens.contains(":: cowcell :: Result < () >"));
    }

    #[test]
    fn test_explicit_trait_name() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                pub fn value(&self) -> i64 { 0 }
            }
        };
        let args = MacroArgs {
            trait_name: Some(format_ident!("CounterOps")),
        };

        let tokens = expand(args, input).unwrap().to_string();
        assert!(tokens.contains("pub trait CounterOps"));
        assert!(tokens.contains("self . read"));
    }

    #[test]
    fn test_cow_attrs_are_stripped() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                #[cow(skip)]
                pub fn reset(&mut self) {}
            }
        };

        let tokens = expand(MacroArgs::default(), input).unwrap().to_string();
        assert!(!tokens.contains("cow (skip)"));
    }

    #[test]
    fn test_self_type_is_made_concrete() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                pub fn merged(&self, other: &Self) -> Self { self.clone() }
            }
        };

        let tokens = expand(MacroArgs::default(), input).unwrap().to_string();
        let forwarding = &tokens[tokens.find("pub trait").unwrap()..];
        assert!(forwarding.contains("__cow_arg0 : & Counter"));
        assert!(forwarding.contains("-> Counter"));
        assert!(!forwarding.contains("Self"));
    }

    #[test]
    fn test_generic_impl_is_rejected() {
        let input: ItemImpl = parse_quote! {
            impl<T> Wrapper<T> {
                pub fn get(&self) -> &T { &self.0 }
            }
        };

        assert!(expand(MacroArgs::default(), input).is_err());
    }
}
