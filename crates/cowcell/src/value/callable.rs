//! Callable value types: methods, accessor halves, and clone hooks

use std::fmt;
use std::rc::Rc;

use super::{ObjectRef, Value};
use crate::depth::CloneDepth;
use crate::error::Result;

/// Type alias for native function pointers to reduce complexity.
///
/// The first argument is the receiver (`this`), the second the call
/// arguments.
pub type NativeFnPtr = Rc<dyn Fn(&Value, &[Value]) -> Result<Value>>;

/// Getter half of an accessor; receives the object it is read from.
pub type Getter = Rc<dyn Fn(&ObjectRef) -> Result<Value>>;

/// Setter half of an accessor; receives the object it is written on.
pub type Setter = Rc<dyn Fn(&ObjectRef, Value) -> Result<()>>;

/// A type-supplied clone hook.
///
/// Must not mutate the receiver and must return an instance structurally
/// independent of it (down to `depth`, at the hook's discretion).
pub type CloneHook = Rc<dyn Fn(&ObjectRef, CloneDepth) -> Result<ObjectRef>>;

/// A native function exposed as a member.
#[derive(Clone)]
pub struct NativeFn {
    /// Function name (for display/debugging)
    pub name: Rc<str>,

    /// The actual function pointer
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Create a named native function.
    pub fn new(
        name: impl AsRef<str>,
        func: impl Fn(&Value, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name.as_ref()),
            func: Rc::new(func),
        }
    }

    /// Invoke the function with the given receiver and arguments.
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value> {
        (self.func)(this, args)
    }

    /// Check whether two handles point at the same function.
    pub fn ptr_eq(&self, other: &NativeFn) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}
