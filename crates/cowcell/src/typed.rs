//! Copy-on-write cells over plain Rust values
//!
//! The dynamic [`ImmutableRef`](crate::ImmutableRef) has to discover at run
//! time whether an access reads or mutates. Plain Rust types already say so
//! in their receivers: `&self` reads, `&mut self` mutates. [`TypedRef`]
//! routes the two through [`TypedRef::read`] and [`TypedRef::mutate`], and
//! `#[cow_methods]` generates the forwarding trait for an `impl` block.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::depth::CloneDepth;
use crate::error::{CowError, Result};
use crate::listeners::{ListenerId, ListenerRegistry};

/// Clone capability with a depth argument.
///
/// The default uses `Clone`. Override it for types whose copies should
/// share parts (e.g. large `Rc` buffers) or that need to reset state on
/// copy. Implementations must not mutate `self`.
pub trait CustomClone: Clone {
    /// Produce an independent copy, honoring `depth` at discretion.
    fn clone_with_depth(&self, depth: CloneDepth) -> Result<Self> {
        let _ = depth;
        Ok(self.clone())
    }
}

struct TypedState<T> {
    current: RefCell<Rc<RefCell<T>>>,
    enabled: Cell<bool>,
    depth: Cell<CloneDepth>,
    respect_custom: Cell<bool>,
    listeners: ListenerRegistry<TypedRef<T>>,
    clone_count: Cell<u64>,
}

/// Copy-on-write reference cell over a plain Rust value.
///
/// ```
/// use cowcell::{CustomClone, TypedRef};
///
/// #[derive(Clone)]
/// struct Counter {
///     number: i64,
/// }
///
/// impl CustomClone for Counter {}
///
/// let cell = TypedRef::new(Counter { number: 0 });
/// let before = cell.current();
///
/// cell.mutate(|counter| {
///     counter.number += 5;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(cell.read(|counter| counter.number), 5);
/// assert_eq!(before.borrow().number, 0);
/// ```
pub struct TypedRef<T> {
    state: Rc<TypedState<T>>,
}

impl<T> Clone for TypedRef<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: CustomClone + 'static> TypedRef<T> {
    /// Wrap `value` with unbounded depth, honoring its clone hook.
    pub fn new(value: T) -> Self {
        Self::with_policy(value, CloneDepth::Unbounded, true)
    }

    /// Wrap `value` with an explicit depth and hook policy.
    pub fn with_policy(value: T, depth: impl Into<CloneDepth>, respect_custom: bool) -> Self {
        Self {
            state: Rc::new(TypedState {
                current: RefCell::new(Rc::new(RefCell::new(value))),
                enabled: Cell::new(true),
                depth: Cell::new(depth.into()),
                respect_custom: Cell::new(respect_custom),
                listeners: ListenerRegistry::default(),
                clone_count: Cell::new(0),
            }),
        }
    }

    /// Handle to the current instance.
    ///
    /// Committed mutations replace the instance, so a handle taken earlier
    /// keeps showing the value as it was.
    pub fn current(&self) -> Rc<RefCell<T>> {
        self.state.current.borrow().clone()
    }

    /// Read the current value.
    ///
    /// # Panics
    ///
    /// If called from inside a `mutate` closure on a suspended cell, which
    /// holds the only mutable borrow of the live instance.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let current = self.current();
        let value = current.borrow();
        f(&value)
    }

    /// Mutate through copy-on-write.
    ///
    /// The closure gets exclusive access to a clone; on `Ok` the clone
    /// becomes current and listeners run, on `Err` it is dropped. A
    /// suspended cell hands out the live instance instead.
    ///
    /// # Errors
    ///
    /// - whatever the clone hook or the closure returns
    /// - `AlreadyBorrowed` when the live instance is borrowed elsewhere
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let live = self.current();
        if !self.enabled() {
            let mut value = live.try_borrow_mut().map_err(|_| CowError::AlreadyBorrowed)?;
            return f(&mut value);
        }

        let mut copy = {
            let value = live.try_borrow().map_err(|_| CowError::AlreadyBorrowed)?;
            if self.respect_custom() {
                value.clone_with_depth(self.depth())?
            } else {
                value.clone()
            }
        };

        let outcome = {
            let _suspended = self.suspend();
            f(&mut copy)
        };

        match outcome {
            Ok(result) => {
                self.swap(copy);
                Ok(result)
            }
            Err(err) => {
                debug!(error = %err, "mutation failed, clone discarded");
                Err(err)
            }
        }
    }

    fn swap(&self, value: T) {
        *self.state.current.borrow_mut() = Rc::new(RefCell::new(value));
        let count = self.state.clone_count.get() + 1;
        self.state.clone_count.set(count);
        let notified = self.state.listeners.notify(self);
        debug!(clone_count = count, listeners = notified, "clone committed");
    }

    /// Whether mutations clone
    pub fn enabled(&self) -> bool {
        self.state.enabled.get()
    }

    /// Turn copy-on-write on or off
    pub fn set_enabled(&self, enabled: bool) {
        self.state.enabled.set(enabled);
    }

    /// Disable copy-on-write until the returned guard drops.
    ///
    /// The guard restores whatever state the cell had before, so guards nest.
    pub fn suspend(&self) -> TypedSuspendGuard<'_, T> {
        let previous = self.state.enabled.replace(false);
        TypedSuspendGuard { cell: self, previous }
    }

    /// Depth passed to the clone hook
    pub fn depth(&self) -> CloneDepth {
        self.state.depth.get()
    }

    /// Change the depth passed to the clone hook
    pub fn set_depth(&self, depth: impl Into<CloneDepth>) {
        self.state.depth.set(depth.into());
    }

    /// Whether [`CustomClone::clone_with_depth`] is used over `Clone`
    pub fn respect_custom(&self) -> bool {
        self.state.respect_custom.get()
    }

    /// Choose between the clone hook and plain `Clone`
    pub fn set_respect_custom(&self, respect_custom: bool) {
        self.state.respect_custom.set(respect_custom);
    }

    /// Register a listener invoked after every committed clone-swap.
    pub fn on_clone(&self, listener: impl Fn(&TypedRef<T>) + 'static) -> ListenerId {
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

    /// Check whether two handles refer to the same cell.
    pub fn ptr_eq(&self, other: &TypedRef<T>) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.state.current.borrow().clone();
        let mut debug = f.debug_struct("TypedRef");
        match current.try_borrow() {
            Ok(value) => debug.field("current", &*value),
            Err(_) => debug.field("current", &"<borrowed>"),
        };
        debug
            .field("enabled", &self.state.enabled.get())
            .field("clone_count", &self.state.clone_count.get())
            .finish()
    }
}

/// RAII guard that keeps a typed cell's copy-on-write off while alive.
pub struct TypedSuspendGuard<'a, T> {
    cell: &'a TypedRef<T>,
    previous: bool,
}

impl<T> Drop for TypedSuspendGuard<'_, T> {
    fn drop(&mut self) {
        self.cell.state.enabled.set(self.previous);
    }
}

impl<T> std::ops::Deref for TypedSuspendGuard<'_, T> {
    type Target = TypedRef<T>;

    fn deref(&self) -> &Self::Target {
        self.cell
    }
}
