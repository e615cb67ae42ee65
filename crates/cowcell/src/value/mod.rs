//! Value representation for wrapped object graphs

mod callable;
mod display;
mod impls;
mod object;
mod refs;
mod symbol;

pub use callable::{CloneHook, Getter, NativeFn, NativeFnPtr, Setter};
pub use object::{Accessor, Object, ObjectRef, Property, Slot};
pub use refs::{ListRef, OpaqueHandle};
pub use symbol::{PropertyKey, Symbol};

use std::rc::Rc;

/// Runtime value representation for wrapped object graphs.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline primitives (copied by value)
/// - Tier 2: Composites with identity (shared `Rc` handles, cloned structurally)
/// - Tier 3: Leaves (functions are shared by clones, opaque host handles
///   cannot be cloned)
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// The absent value; reads of missing members produce it
    Unit,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    /// Immutable string
    String(Rc<str>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Composites
    // ═══════════════════════════════════════════════════════════════════
    /// Growable list of values
    List(ListRef),

    /// Object with own members and an optional prototype
    Object(ObjectRef),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Shared Leaves
    // ═══════════════════════════════════════════════════════════════════
    /// Native function, usually stored as a method
    Function(NativeFn),

    /// Host handle without inspectable structure
    Opaque(OpaqueHandle),
}
