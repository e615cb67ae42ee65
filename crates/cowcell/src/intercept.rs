//! Interception surface and the commit protocol
//!
//! Every access through a [`Surface`] is classified before it reaches the
//! underlying object:
//!
//! | access                              | effect                         |
//! |-------------------------------------|--------------------------------|
//! | write                               | commit                         |
//! | read of an exempt member            | pass through                   |
//! | read of an accessor                 | commit (getter runs on clone)  |
//! | read of a method                    | bound method; calling commits  |
//! | read of a stored value              | pass through                   |
//!
//! Commit: clone the target, run the operation on the clone with the cell's
//! interception suspended, then swap the clone in and notify listeners. If
//! the operation fails the clone is dropped and nothing observable changes.

use std::fmt;
use std::rc::Weak;

use tracing::{debug, trace};

use crate::accessor::{classify, MemberKind};
use crate::cell::{CellState, ImmutableRef};
use crate::clone::clone_object;
use crate::error::{CowError, Result};
use crate::value::{NativeFn, ObjectRef, PropertyKey, Value};

/// The intercepted view of one instance held by a cell.
///
/// A surface keeps pointing at the instance it was taken from. Once the cell
/// has moved on, mutating through an old surface clones that old instance
/// and repoints the cell at the result. Surfaces of a dropped cell pass
/// every access straight through.
#[derive(Clone)]
pub struct Surface {
    cell: Weak<CellState>,
    target: ObjectRef,
}

impl Surface {
    pub(crate) fn new(cell: Weak<CellState>, target: ObjectRef) -> Self {
        Self { cell, target }
    }

    /// The raw instance behind this surface.
    ///
    /// Mutating it directly bypasses copy-on-write.
    pub fn target(&self) -> &ObjectRef {
        &self.target
    }

    /// Check whether two surfaces view the same instance.
    pub fn same_target(&self, other: &Surface) -> bool {
        self.target.ptr_eq(&other.target)
    }

    /// Keys of the instance's enumerable own members
    pub fn keys(&self) -> Vec<PropertyKey> {
        self.target.keys()
    }

    /// The owning cell, if it is alive and intercepting.
    fn intercepting(&self) -> Option<ImmutableRef> {
        let state = self.cell.upgrade()?;
        state.enabled().then_some(ImmutableRef { state })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Access
    // ═══════════════════════════════════════════════════════════════════

    /// Read a member.
    ///
    /// Methods come back as bound functions that commit when called;
    /// accessors are evaluated on a clone, which is then committed.
    pub fn get(&self, key: impl Into<PropertyKey>) -> Result<Value> {
        let key = key.into();
        let Some(cell) = self.intercepting() else {
            return self.target.get(&key);
        };
        if cell.is_non_mutating(&key) {
            trace!(%key, "exempt member, passing through");
            return self.target.get(&key);
        }
        match classify(&self.target, &key) {
            MemberKind::Accessor => {
                trace!(%key, "accessor read");
                commit(&cell, &self.target, &key, |copy| copy.get(&key))
            }
            MemberKind::Method => {
                trace!(%key, "binding method");
                Ok(Value::Function(self.bind_method(key)))
            }
            MemberKind::Field | MemberKind::Missing => self.target.get(&key),
        }
    }

    /// Write a member. Always commits while intercepting, exempt or not.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        match self.intercepting() {
            Some(cell) => {
                trace!(%key, "write");
                commit(&cell, &self.target, &key, |copy| copy.set(&key, value))
            }
            None => self.target.set(&key, value),
        }
    }

    /// Read a member and call it.
    ///
    /// A function produced by an accessor is read and called inside one
    /// commit, with the clone as receiver. Methods commit through their
    /// bound form; exempt and pass-through members run on this instance.
    pub fn call(&self, key: impl Into<PropertyKey>, args: &[Value]) -> Result<Value> {
        let key = key.into();
        if let Some(cell) = self.intercepting() {
            let exempt = cell.is_non_mutating(&key);
            if !exempt && classify(&self.target, &key) == MemberKind::Accessor {
                trace!(%key, "calling accessor result");
                return commit(&cell, &self.target, &key, |copy| {
                    let member = copy.get(&key)?;
                    call_member(copy, &key, member, args)
                });
            }
        }
        let member = self.get(&key)?;
        call_member(&self.target, &key, member, args)
    }

    fn bind_method(&self, key: PropertyKey) -> NativeFn {
        let name = key
            .as_name()
            .map_or_else(|| key.to_string(), str::to_string);
        let surface = self.clone();
        NativeFn::new(name, move |_this, args| surface.invoke(&key, args))
    }

    /// Call a bound method. Re-checks the cell, since the call may happen
    /// long after the read, or from inside another commit.
    fn invoke(&self, key: &PropertyKey, args: &[Value]) -> Result<Value> {
        match self.intercepting() {
            Some(cell) => commit(&cell, &self.target, key, |copy| copy.call_method(key, args)),
            None => self.target.call_method(key, args),
        }
    }
}

fn call_member(
    receiver: &ObjectRef,
    key: &PropertyKey,
    member: Value,
    args: &[Value],
) -> Result<Value> {
    match member {
        Value::Function(func) => func.call(&Value::Object(receiver.clone()), args),
        _ if !receiver.has(key) => Err(CowError::MissingMember { key: key.clone() }),
        _ => Err(CowError::NotCallable { key: key.clone() }),
    }
}

/// Run `op` against a clone of `source` and commit the clone on success.
fn commit<R>(
    cell: &ImmutableRef,
    source: &ObjectRef,
    key: &PropertyKey,
    op: impl FnOnce(&ObjectRef) -> Result<R>,
) -> Result<R> {
    let copy = clone_object(source, cell.depth(), cell.respect_custom())?;

    let outcome = {
        let _suspended = cell.suspend();
        op(&copy)
    };

    match outcome {
        Ok(result) => {
            cell.swap(copy);
            Ok(result)
        }
        Err(err) => {
            debug!(%key, error = %err, "operation failed, clone discarded");
            Err(err)
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surface({:?})", self.target)
    }
}
