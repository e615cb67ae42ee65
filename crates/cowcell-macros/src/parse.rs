//! Parsing logic for the `#[cow_methods]` attribute.

use syn::meta::ParseNestedMeta;
use syn::visit::{self, Visit};
use syn::{
    Attribute, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Lifetime, LitStr, ReturnType, Type,
    TypeBareFn, TypeReference, Visibility,
};

/// Arguments given to `#[cow_methods(...)]`.
#[derive(Debug, Default)]
pub struct MacroArgs {
    /// Explicit name for the generated trait.
    pub trait_name: Option<Ident>,
}

impl MacroArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("trait_name") {
            let name: LitStr = meta.value()?.parse()?;
            self.trait_name = Some(name.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported cow_methods argument; expected `trait_name`"))
        }
    }
}

/// How a forwarded method reaches the wrapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Through `TypedRef::read`
    Read,

    /// Through `TypedRef::mutate`
    Mutate,
}

/// A method selected for forwarding.
#[derive(Debug)]
pub struct Forwarded {
    /// The method as written (cow attributes already removed).
    pub method: ImplItemFn,

    /// How the call is routed.
    pub route: Route,

    /// Whether the method returns `cowcell::Result<R>` itself.
    pub fallible: bool,
}

impl Forwarded {
    /// Declared (non-receiver) arguments with their types.
    pub fn arg_types(&self) -> Vec<&Type> {
        self.method
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(&*pat_type.ty),
                FnArg::Receiver(_) => None,
            })
            .collect()
    }
}

/// Markers found in `#[cow(...)]` on one method.
#[derive(Debug, Default)]
struct MethodFlags {
    read: bool,
    mutating: bool,
    fallible: bool,
    skip: bool,
}

impl MethodFlags {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut flags = MethodFlags::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("cow")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("read") {
                    flags.read = true;
                } else if meta.path.is_ident("mutating") {
                    flags.mutating = true;
                } else if meta.path.is_ident("fallible") {
                    flags.fallible = true;
                } else if meta.path.is_ident("skip") {
                    flags.skip = true;
                } else {
                    return Err(meta.error(
                        "unsupported cow attribute; expected read, mutating, fallible or skip",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(flags)
    }
}

/// Finds borrows in a return type: references and named lifetimes other
/// than `'static`. Function pointer types are opaque to the search.
#[derive(Default)]
struct BorrowFinder {
    found: bool,
}

impl<'ast> Visit<'ast> for BorrowFinder {
    fn visit_type_reference(&mut self, reference: &'ast TypeReference) {
        if reference.lifetime.is_none() {
            self.found = true;
        }
        visit::visit_type_reference(self, reference);
    }

    fn visit_lifetime(&mut self, lifetime: &'ast Lifetime) {
        if lifetime.ident != "static" {
            self.found = true;
        }
    }

    fn visit_type_bare_fn(&mut self, _: &'ast TypeBareFn) {}
}

/// Whether a method's return value borrows from its arguments or receiver.
///
/// Forwarded calls run inside a closure over a cell borrow, so such a value
/// cannot leave the forwarding method.
fn returns_borrow(output: &ReturnType) -> bool {
    let mut finder = BorrowFinder::default();
    finder.visit_return_type(output);
    finder.found
}

/// Remove `#[cow(...)]` attributes so the impl block compiles as written.
pub fn strip_cow_attrs(input: &mut ItemImpl) {
    for item in &mut input.items {
        if let ImplItem::Fn(method) = item {
            method.attrs.retain(|attr| !attr.path().is_ident("cow"));
        }
    }
}

/// Pick the methods to forward and classify them.
pub fn collect_methods(input: &ItemImpl) -> syn::Result<Vec<Forwarded>> {
    let mut methods = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let flags = MethodFlags::from_attrs(&method.attrs)?;
        if flags.skip || !matches!(method.vis, Visibility::Public(_)) {
            continue;
        }

        let mutable_receiver = match method.sig.receiver() {
            Some(receiver) if receiver.reference.is_some() => receiver.mutability.is_some(),
            // By-value and associated functions have nothing to forward to
            _ => continue,
        };

        if let Some(asyncness) = &method.sig.asyncness {
            return Err(syn::Error::new_spanned(
                asyncness,
                "#[cow_methods] cannot forward async methods",
            ));
        }
        if returns_borrow(&method.sig.output) {
            return Err(syn::Error::new_spanned(
                &method.sig.output,
                "#[cow_methods] cannot forward methods returning borrows; add #[cow(skip)]",
            ));
        }
        if flags.read && mutable_receiver {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "#[cow(read)] requires a `&self` receiver; `&mut self` methods always clone",
            ));
        }
        if flags.read && flags.mutating {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "#[cow(read)] and #[cow(mutating)] cannot be used together",
            ));
        }

        let route = if mutable_receiver || flags.mutating {
            Route::Mutate
        } else {
            Route::Read
        };

        let mut method = method.clone();
        method.attrs.retain(|attr| !attr.path().is_ident("cow"));
        methods.push(Forwarded {
            method,
            route,
            fallible: flags.fallible,
        });
    }

    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_collect_routes_by_receiver() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                pub fn get(&self) -> i64 { self.n }
                pub fn bump(&mut self) { self.n += 1; }
                pub fn new() -> Self { Counter { n: 0 } }
                fn private(&mut self) {}
            }
        };

        let methods = collect_methods(&input).unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].route, Route::Read);
        assert_eq!(methods[1].route, Route::Mutate);
    }

    #[test]
    fn test_mutating_marker_forces_clone() {
        let input: ItemImpl = parse_quote! {
            impl Cache {
                #[cow(mutating)]
                pub fn lookup(&self, key: u32) -> u32 { key }
            }
        };

        let methods = collect_methods(&input).unwrap();
        assert_eq!(methods[0].route, Route::Mutate);
        assert!(methods[0].method.attrs.is_empty());
    }

    #[test]
    fn test_read_marker_on_mut_receiver_is_rejected() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                #[cow(read)]
                pub fn bump(&mut self) {}
            }
        };

        assert!(collect_methods(&input).is_err());
    }

    #[test]
    fn test_skip_and_fallible() {
        let input: ItemImpl = parse_quote! {
            impl Counter {
                #[cow(skip)]
                pub fn internal(&mut self) {}
                #[cow(fallible)]
                pub fn checked(&mut self, by: i64) -> cowcell::Result<()> { Ok(()) }
            }
        };

        let methods = collect_methods(&input).unwrap();
        assert_eq!(methods.len(), 1);
        assert!(methods[0].fallible);
        assert_eq!(methods[0].arg_types().len(), 1);
    }

    #[test]
    fn test_borrowed_return_is_rejected() {
        let input: ItemImpl = parse_quote! {
            impl Ledger {
                pub fn first(&self) -> &str { &self.entries[0] }
            }
        };

        let err = collect_methods(&input).unwrap_err();
        assert!(err.to_string().contains("returning borrows"));
    }

    #[test]
    fn test_borrow_nested_in_result_is_rejected() {
        let input: ItemImpl = parse_quote! {
            impl Ledger {
                #[cow(fallible)]
                pub fn last_mut<'a>(&'a mut self) -> cowcell::Result<Option<&'a mut String>> {
                    Ok(self.entries.last_mut())
                }
            }
        };

        assert!(collect_methods(&input).is_err());
    }

    #[test]
    fn test_static_and_owned_returns_are_forwarded() {
        let input: ItemImpl = parse_quote! {
            impl Ledger {
                pub fn kind(&self) -> &'static str { "ledger" }
                pub fn format(&self) -> fn(&str) -> String { str::to_string }
                pub fn entries(&self) -> Vec<String> { self.entries.clone() }
            }
        };

        assert_eq!(collect_methods(&input).unwrap().len(), 3);
    }

    #[test]
    fn test_skipped_borrowing_method_is_ignored() {
        let input: ItemImpl = parse_quote! {
            impl Ledger {
                #[cow(skip)]
                pub fn first(&self) -> &str { &self.entries[0] }
            }
        };

        assert!(collect_methods(&input).unwrap().is_empty());
    }
}
