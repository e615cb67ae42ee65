//! Value trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::collections::HashSet;
use std::rc::Rc;

use super::*;
use crate::error::{CowError, Result};

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }

    /// Create an object value
    pub fn object(object: Object) -> Self {
        Value::Object(object.into_ref())
    }

    /// Create a function value
    pub fn function(
        name: impl AsRef<str>,
        func: impl Fn(&Value, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Value::Function(NativeFn::new(name, func))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is the unit value
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Check if value has identity and structure (list or object)
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Object(_))
    }

    /// Check if value is callable
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as f64 (converts from integers)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract list handle
    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Extract object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Extract function handle
    pub fn as_function(&self) -> Option<&NativeFn> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Extract host handle
    pub fn as_opaque(&self) -> Option<&OpaqueHandle> {
        match self {
            Value::Opaque(handle) => Some(handle),
            _ => None,
        }
    }

    /// Extract integer value or fail with a type error
    pub fn expect_int(&self) -> Result<i64> {
        self.as_int().ok_or_else(|| CowError::type_error("int", self))
    }

    /// Extract object handle or fail with a type error.
    ///
    /// Methods use this to get at their receiver.
    pub fn expect_object(&self) -> Result<&ObjectRef> {
        self.as_object().ok_or_else(|| CowError::type_error("object", self))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Identity
    // ═══════════════════════════════════════════════════════════════════

    /// Identity comparison: composites and leaves compare by handle,
    /// primitives by value.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),
            _ => self == other,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self, other, &mut HashSet::new())
    }
}

/// Structural equality over possibly cyclic graphs.
///
/// A pair of composites already under comparison is assumed equal, which
/// lets two isomorphic cycles compare equal instead of recursing forever.
fn structural_eq(a: &Value, b: &Value, in_progress: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Unit, Value::Unit) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,

        // Leaves compare by identity
        (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
        (Value::Opaque(a), Value::Opaque(b)) => a.ptr_eq(b),

        (Value::List(a), Value::List(b)) => {
            if a.ptr_eq(b) || !in_progress.insert((a.id(), b.id())) {
                return true;
            }
            let (left, right) = (a.snapshot(), b.snapshot());
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(x, y)| structural_eq(x, y, in_progress))
        }

        (Value::Object(a), Value::Object(b)) => {
            if a.ptr_eq(b) || !in_progress.insert((a.id(), b.id())) {
                return true;
            }
            let (left, right) = (a.own_properties(), b.own_properties());
            a.class_name() == b.class_name()
                && left.len() == right.len()
                && left.iter().all(|(key, lp)| {
                    right
                        .iter()
                        .find(|(k, _)| k == key)
                        .is_some_and(|(_, rp)| match (&lp.slot, &rp.slot) {
                            (Slot::Data(x), Slot::Data(y)) => structural_eq(x, y, in_progress),
                            (Slot::Accessor(x), Slot::Accessor(y)) => same_accessor(x, y),
                            _ => false,
                        })
                })
        }

        // Different types are never equal
        _ => false,
    }
}

fn same_accessor(a: &Accessor, b: &Accessor) -> bool {
    let get = match (&a.get, &b.get) {
        (Some(x), Some(y)) => Rc::ptr_eq(x, y),
        (None, None) => true,
        _ => false,
    };
    let set = match (&a.set, &b.set) {
        (Some(x), Some(y)) => Rc::ptr_eq(x, y),
        (None, None) => true,
        _ => false,
    };
    get && set
}

// ═══════════════════════════════════════════════════════════════════
// From Trait Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<ListRef> for Value {
    fn from(list: ListRef) -> Self {
        Value::List(list)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::object(object)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

impl From<NativeFn> for Value {
    fn from(func: NativeFn) -> Self {
        Value::Function(func)
    }
}

impl From<OpaqueHandle> for Value {
    fn from(handle: OpaqueHandle) -> Self {
        Value::Opaque(handle)
    }
}
