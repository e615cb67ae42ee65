//! Code generation for cowcell typed copy-on-write wrappers.
//!
//! This crate provides the `#[cow_methods]` attribute, which reads an
//! inherent `impl` block and generates:
//! - the `impl` block itself, with `#[cow(...)]` markers stripped
//! - a trait `{Type}Cow` with one forwarding method per public method
//! - `impl {Type}Cow for cowcell::TypedRef<{Type}>`
//!
//! # Usage
//!
//! ```ignore
//! use cowcell::{cow_methods, CustomClone, TypedRef};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     number: i64,
//! }
//!
//! impl CustomClone for Counter {}
//!
//! #[cow_methods]
//! impl Counter {
//!     pub fn number(&self) -> i64 {
//!         self.number
//!     }
//!
//!     pub fn increment(&mut self, by: i64) {
//!         self.number += by;
//!     }
//! }
//!
//! let cell = TypedRef::new(Counter { number: 0 });
//! cell.increment(5)?;             // clones once, then swaps
//! assert_eq!(cell.number(), 5);  // plain read
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemImpl};

mod codegen;
mod parse;

/// Generate a copy-on-write forwarding trait for an inherent `impl` block.
///
/// Only `pub` methods taking `&self` or `&mut self` are forwarded.
/// Classification follows the receiver:
///
/// - `&self`: read, forwarded through `TypedRef::read`, same return type
/// - `&mut self`: mutating, forwarded through `TypedRef::mutate`, returns
///   `cowcell::Result<R>`
///
/// # Attributes
///
/// ## Macro Arguments
///
/// - `#[cow_methods(trait_name = "CounterOps")]`: name the generated trait
///
/// ## Method Attributes
///
/// - `#[cow(read)]`: assert the method is a read (rejected on `&mut self`)
/// - `#[cow(mutating)]`: force a `&self` method through `mutate`, for
///   methods with interior side effects
/// - `#[cow(fallible)]`: the method already returns `cowcell::Result<R>`;
///   a failure discards the clone
/// - `#[cow(skip)]`: do not forward this method
#[proc_macro_attribute]
pub fn cow_methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = parse::MacroArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemImpl);

    match codegen::expand(args, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
