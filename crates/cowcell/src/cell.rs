//! The reference cell: current value, policy toggles, and listeners

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::debug;

use crate::depth::CloneDepth;
use crate::error::{CowError, Result};
use crate::intercept::Surface;
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::options::{WrapOptions, CLONE_MEMBER};
use crate::value::{ObjectRef, PropertyKey, Value};

pub(crate) struct CellState {
    current: RefCell<ObjectRef>,
    enabled: Cell<bool>,
    depth: Cell<CloneDepth>,
    respect_custom: Cell<bool>,
    non_mutating_keys: RefCell<IndexSet<String>>,
    listeners: ListenerRegistry<ImmutableRef>,
    clone_count: Cell<u64>,
}

impl CellState {
    pub(crate) fn enabled(&self) -> bool {
        self.enabled.get()
    }
}

/// A self-updating reference to a copy-on-write value.
///
/// All interaction goes through [`ImmutableRef::current`]. Accesses that may
/// mutate are redirected onto a fresh clone, and the cell is repointed to
/// that clone once the access succeeds; the instance it pointed at before
/// is never changed. Cloning the handle shares the cell.
///
/// # Example
///
/// ```
/// use cowcell::{wrap, Object, Value, WrapOptions};
///
/// let counter = Object::new("Counter")
///     .with_field("number", 0)
///     .with_method("increment", |this, args| {
///         let this = this.expect_object()?;
///         let by = args.first().map_or(Ok(1), Value::expect_int)?;
///         let number = this.get(&"number".into())?.expect_int()?;
///         this.set(&"number".into(), Value::Int(number + by))?;
///         Ok(Value::Unit)
///     });
///
/// let cell = wrap(counter, WrapOptions::default()).unwrap();
/// let before = cell.current();
///
/// cell.current().call("increment", &[Value::Int(5)]).unwrap();
///
/// assert_eq!(cell.current().get("number").unwrap(), Value::Int(5));
/// assert_eq!(before.get("number").unwrap(), Value::Int(0));
/// assert_eq!(cell.clone_count(), 1);
/// ```
#[derive(Clone)]
pub struct ImmutableRef {
    pub(crate) state: Rc<CellState>,
}

impl ImmutableRef {
    /// Wrap an object under the given policy.
    pub fn new(object: ObjectRef, options: WrapOptions) -> Self {
        let WrapOptions {
            depth,
            non_mutating_keys,
            respect_custom,
        } = options;
        Self {
            state: Rc::new(CellState {
                current: RefCell::new(object),
                enabled: Cell::new(true),
                depth: Cell::new(depth),
                respect_custom: Cell::new(respect_custom),
                non_mutating_keys: RefCell::new(non_mutating_keys),
                listeners: ListenerRegistry::default(),
                clone_count: Cell::new(0),
            }),
        }
    }

    /// The live, intercepted value.
    pub fn current(&self) -> Surface {
        Surface::new(Rc::downgrade(&self.state), self.state.current.borrow().clone())
    }

    /// Check whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &ImmutableRef) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Policy
    // ═══════════════════════════════════════════════════════════════════

    /// Whether accesses are intercepted
    pub fn enabled(&self) -> bool {
        self.state.enabled()
    }

    /// Turn interception on or off; off means accesses act on the live
    /// value in place, with no clones and no notifications.
    pub fn set_enabled(&self, enabled: bool) {
        debug!(enabled, "interception toggled");
        self.state.enabled.set(enabled);
    }

    /// Disable interception until the returned guard drops.
    ///
    /// The guard restores whatever state the cell had before, so guards nest.
    pub fn suspend(&self) -> SuspendGuard<'_> {
        let previous = self.state.enabled.replace(false);
        SuspendGuard { cell: self, previous }
    }

    /// Clone depth used on every triggered clone
    pub fn depth(&self) -> CloneDepth {
        self.state.depth.get()
    }

    /// Change the clone depth for subsequent clones
    pub fn set_depth(&self, depth: impl Into<CloneDepth>) {
        self.state.depth.set(depth.into());
    }

    /// Whether type-supplied clone hooks are honored
    pub fn respect_custom(&self) -> bool {
        self.state.respect_custom.get()
    }

    /// Honor or ignore type-supplied clone hooks
    pub fn set_respect_custom(&self, respect_custom: bool) {
        self.state.respect_custom.set(respect_custom);
    }

    /// Members explicitly exempted from cloning, in insertion order
    pub fn non_mutating_keys(&self) -> Vec<String> {
        self.state.non_mutating_keys.borrow().iter().cloned().collect()
    }

    /// Exempt a member from cloning. Returns false if it already was.
    pub fn add_non_mutating_key(&self, key: impl Into<String>) -> bool {
        self.state.non_mutating_keys.borrow_mut().insert(key.into())
    }

    /// Stop exempting a member. Returns whether it was exempt.
    pub fn remove_non_mutating_key(&self, key: &str) -> bool {
        self.state.non_mutating_keys.borrow_mut().shift_remove(key)
    }

    /// Check whether reading `key` bypasses cloning.
    ///
    /// The clone-producing member is always exempt.
    pub fn is_non_mutating(&self, key: &PropertyKey) -> bool {
        match key.as_name() {
            Some(CLONE_MEMBER) => true,
            Some(name) => self.state.non_mutating_keys.borrow().contains(name),
            None => false,
        }
    }

    /// Snapshot of the current policy
    pub fn options(&self) -> WrapOptions {
        WrapOptions {
            depth: self.depth(),
            non_mutating_keys: self.state.non_mutating_keys.borrow().clone(),
            respect_custom: self.respect_custom(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Listeners
    // ═══════════════════════════════════════════════════════════════════

    /// Register a listener invoked after every committed clone-swap.
    pub fn on_clone(&self, listener: impl Fn(&ImmutableRef) + 'static) -> ListenerId {
        self.state.listeners.add(Rc::new(listener))
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.listeners.remove(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }

    /// Number of committed clone-swaps over the cell's life
    pub fn clone_count(&self) -> u64 {
        self.state.clone_count.get()
    }

    /// Repoint the cell at a committed clone and notify listeners.
    pub(crate) fn swap(&self, target: ObjectRef) {
        *self.state.current.borrow_mut() = target;
        let count = self.state.clone_count.get() + 1;
        self.state.clone_count.set(count);
        let notified = self.state.listeners.notify(self);
        debug!(clone_count = count, listeners = notified, "clone committed");
    }
}

impl fmt::Debug for ImmutableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableRef")
            .field("current", &*self.state.current.borrow())
            .field("enabled", &self.enabled())
            .field("depth", &self.depth())
            .field("respect_custom", &self.respect_custom())
            .field("clone_count", &self.clone_count())
            .finish()
    }
}

/// RAII guard that keeps a cell's interception off while alive.
///
/// The previous state comes back when the guard drops, on every exit path.
///
/// # Example
///
/// ```
/// use cowcell::{wrap, Object, Value, WrapOptions};
///
/// let cell = wrap(Object::new("Point").with_field("x", 1), WrapOptions::default()).unwrap();
/// let before = cell.current();
///
/// {
///     let guard = cell.suspend();
///     guard.current().set("x", 2).unwrap();
/// }
///
/// assert!(cell.enabled());
/// assert_eq!(cell.clone_count(), 0);
/// assert_eq!(before.get("x").unwrap(), Value::Int(2));
/// ```
pub struct SuspendGuard<'a> {
    cell: &'a ImmutableRef,
    previous: bool,
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        self.cell.state.enabled.set(self.previous);
    }
}

impl std::ops::Deref for SuspendGuard<'_> {
    type Target = ImmutableRef;

    fn deref(&self) -> &Self::Target {
        self.cell
    }
}

/// Wrap `value` in a reference cell.
///
/// # Errors
///
/// `TypeError` unless `value` is an object; only objects have members to
/// intercept.
pub fn wrap(value: impl Into<Value>, options: WrapOptions) -> Result<ImmutableRef> {
    match value.into() {
        Value::Object(object) => Ok(ImmutableRef::new(object, options)),
        other => Err(CowError::type_error("object", &other)),
    }
}

/// Wrap `value` with the policy given piecewise.
pub fn wrap_with<I, S>(
    value: impl Into<Value>,
    depth: impl Into<CloneDepth>,
    non_mutating_keys: I,
    respect_custom: bool,
) -> Result<ImmutableRef>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let options = WrapOptions::new()
        .with_depth(depth)
        .with_non_mutating_keys(non_mutating_keys)
        .with_respect_custom(respect_custom);
    wrap(value, options)
}
