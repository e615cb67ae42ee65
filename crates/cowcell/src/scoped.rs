//! One-shot clone-mutate-return helpers

use crate::clone::clone_value;
use crate::depth::CloneDepth;
use crate::error::Result;
use crate::typed::CustomClone;
use crate::value::Value;

/// Deep-clone `value`, let `mutate` change the clone directly, and return it.
///
/// No cell, no listeners, no interception: the callback works on the raw
/// clone. `value` itself is never touched.
///
/// ```
/// use cowcell::{immutable_mut, Object, Value};
///
/// let original = Object::new("Point").with_field("x", 1).into_value();
/// let moved = immutable_mut(
///     &original,
///     |copy| copy.expect_object()?.set(&"x".into(), Value::Int(9)),
///     true,
/// )
/// .unwrap();
///
/// assert_eq!(moved.expect_object().unwrap().get(&"x".into()).unwrap(), Value::Int(9));
/// assert_eq!(original.expect_object().unwrap().get(&"x".into()).unwrap(), Value::Int(1));
/// ```
pub fn immutable_mut(
    value: &Value,
    mutate: impl FnOnce(&Value) -> Result<()>,
    respect_custom: bool,
) -> Result<Value> {
    let copy = clone_value(value, CloneDepth::Unbounded, respect_custom)?;
    mutate(&copy)?;
    Ok(copy)
}

/// Typed counterpart of [`immutable_mut`] for plain Rust values.
///
/// With `respect_custom` the clone goes through
/// [`CustomClone::clone_with_depth`]; otherwise plain `Clone` is used.
pub fn immutable_mut_typed<T: CustomClone>(
    value: &T,
    mutate: impl FnOnce(&mut T) -> Result<()>,
    respect_custom: bool,
) -> Result<T> {
    let mut copy = if respect_custom {
        value.clone_with_depth(CloneDepth::Unbounded)?
    } else {
        value.clone()
    };
    mutate(&mut copy)?;
    Ok(copy)
}
