//! Structural cloning of value graphs
//!
//! Cloning never mutates its input. The policy applied to each composite,
//! in order:
//!
//! 1. An object with a clone hook, when custom hooks are respected, is
//!    cloned entirely by its hook, which receives the remaining depth.
//! 2. Otherwise a fresh composite is built and its own members are copied:
//!    accessor definitions verbatim, primitives by value, and nested
//!    composites recursively while depth remains, shared once it runs out.
//!
//! A seen-map keyed by source identity makes the copy cycle-safe and keeps
//! aliasing intact: a composite reachable by two paths is copied once and
//! both paths point at the same copy.

use std::collections::HashMap;

use tracing::trace;

use crate::depth::CloneDepth;
use crate::error::{CowError, Result};
use crate::value::{ListRef, ObjectRef, Property, Slot, Value};

/// Clone `value` down to `depth` levels.
///
/// Primitives and shared leaves (functions) come back as-is.
///
/// # Errors
///
/// - whatever a clone hook returns
/// - `Unclonable` when an opaque handle would have to be copied
pub fn clone_value(value: &Value, depth: CloneDepth, respect_custom: bool) -> Result<Value> {
    Cloner::new(respect_custom).copy(value, depth)
}

/// Clone an object down to `depth` levels; see [`clone_value`].
pub fn clone_object(
    object: &ObjectRef,
    depth: CloneDepth,
    respect_custom: bool,
) -> Result<ObjectRef> {
    Cloner::new(respect_custom).copy_object(object, depth)
}

/// One clone pass. Holds the seen-map for the duration of the pass.
struct Cloner {
    respect_custom: bool,
    seen: HashMap<usize, Value>,
}

impl Cloner {
    fn new(respect_custom: bool) -> Self {
        Self {
            respect_custom,
            seen: HashMap::new(),
        }
    }

    /// Copy a value whose own level must be reproduced.
    fn copy(&mut self, value: &Value, depth: CloneDepth) -> Result<Value> {
        match value {
            Value::Object(object) => self.copy_object(object, depth).map(Value::Object),
            Value::List(list) => self.copy_list(list, depth).map(Value::List),
            Value::Opaque(handle) => Err(CowError::Unclonable {
                type_name: handle.type_name().to_string(),
            }),
            _ => Ok(value.clone()),
        }
    }

    /// Copy a member value of a composite being copied at `depth`.
    fn member(&mut self, value: &Value, depth: CloneDepth) -> Result<Value> {
        let has_level = value.is_composite() || matches!(value, Value::Opaque(_));
        if !has_level || depth.is_exhausted() {
            return Ok(value.clone());
        }
        self.copy(value, depth.decrement())
    }

    fn copy_object(&mut self, source: &ObjectRef, depth: CloneDepth) -> Result<ObjectRef> {
        if let Some(Value::Object(copy)) = self.seen.get(&source.id()) {
            return Ok(copy.clone());
        }

        if self.respect_custom {
            if let Some(hook) = source.clone_hook() {
                trace!(class = %source.class_name(), %depth, "delegating to clone hook");
                let copy = hook(source, depth)?;
                self.seen.insert(source.id(), Value::Object(copy.clone()));
                return Ok(copy);
            }
        }

        // Register before descending so cycles resolve to this copy
        let copy = source.shell().into_ref();
        self.seen.insert(source.id(), Value::Object(copy.clone()));

        for (key, property) in source.own_properties() {
            let slot = match property.slot {
                Slot::Accessor(accessor) => Slot::Accessor(accessor),
                Slot::Data(value) => Slot::Data(self.member(&value, depth)?),
            };
            copy.define_property(key, Property { slot, ..property });
        }
        Ok(copy)
    }

    fn copy_list(&mut self, source: &ListRef, depth: CloneDepth) -> Result<ListRef> {
        if let Some(Value::List(copy)) = self.seen.get(&source.id()) {
            return Ok(copy.clone());
        }

        let copy = ListRef::new(Vec::with_capacity(source.len()));
        self.seen.insert(source.id(), Value::List(copy.clone()));

        for item in source.snapshot() {
            copy.push(self.member(&item, depth)?);
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn test_primitives_pass_through() {
        let value = Value::Int(4);
        assert_eq!(clone_value(&value, CloneDepth::SHALLOW, true).unwrap(), value);
    }

    #[test]
    fn test_root_is_always_distinct() {
        let obj = Object::new("Point").with_field("x", 1).into_ref();
        let copy = clone_object(&obj, CloneDepth::SHALLOW, true).unwrap();
        assert!(!copy.ptr_eq(&obj));
        assert_eq!(Value::Object(copy), Value::Object(obj));
    }

    #[test]
    fn test_opaque_root_is_unclonable() {
        let handle = crate::value::OpaqueHandle::new("Socket", 3_u16);
        let err = clone_value(&Value::Opaque(handle), CloneDepth::Unbounded, true).unwrap_err();
        assert!(matches!(err, CowError::Unclonable { type_name } if type_name == "Socket"));
    }
}
