//! # Cowcell
//!
//! Copy-on-write value semantics layered over a mutable, method-and-member
//! object API, without touching the object's implementation.
//!
//! A caller holds a reference cell. Every access that could mutate the
//! wrapped value is redirected onto a fresh copy, and the cell is repointed
//! to that copy once the access succeeds. Pure reads pass through.
//!
//! ## Architecture
//!
//! - **Clone engine** ([`clone_value`]): depth-bounded, cycle-safe
//!   structural copy that defers to type-supplied clone hooks
//! - **Accessor classifier** ([`classify`]): tells computed members from
//!   stored ones, searching the prototype chain
//! - **Interceptor** ([`Surface`]): classifies each access and runs the
//!   clone, apply, swap, notify protocol, batching everything one access
//!   does into a single clone
//! - **Reference cell** ([`ImmutableRef`]): current value, policy toggles
//!   and clone listeners
//! - **Scoped mutate** ([`immutable_mut`]): one-shot clone-mutate-return
//! - **Typed cells** ([`TypedRef`], [`cow_methods`]): the same protocol over
//!   plain Rust values, classified by receiver at compile time
//!
//! The model is single-threaded: cells use `Rc` and `RefCell` and are
//! neither `Send` nor `Sync`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod cell;
pub mod clone;
pub mod depth;
pub mod error;
pub mod intercept;
pub mod listeners;
pub mod options;
pub mod scoped;
pub mod typed;
pub mod value;

// Re-export main types
pub use accessor::{classify, is_accessor, MemberKind};
pub use cell::{wrap, wrap_with, ImmutableRef, SuspendGuard};
pub use clone::{clone_object, clone_value};
pub use cowcell_macros::cow_methods;
pub use depth::CloneDepth;
pub use error::{type_name, CowError, Result};
pub use intercept::Surface;
pub use listeners::{Listener, ListenerId};
pub use options::{WrapOptions, CLONE_MEMBER};
pub use scoped::{immutable_mut, immutable_mut_typed};
pub use typed::{CustomClone, TypedRef, TypedSuspendGuard};
pub use value::{
    Accessor, CloneHook, Getter, ListRef, NativeFn, NativeFnPtr, Object, ObjectRef, OpaqueHandle,
    Property, PropertyKey, Setter, Slot, Symbol, Value,
};

/// Cowcell version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
