//! Identity-bearing handles: lists and opaque host values

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Value;

/// A shared, mutable list.
///
/// Cloning the handle shares the list; use the clone engine for a copy.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    /// Create a list holding `items`.
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Get an item by index
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Replace the item at `index`. Returns false when out of bounds.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Append an item
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Copy of the current items (handles inside are shared)
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Check whether two handles point at the same list.
    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying list, stable while it is alive.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", Value::List(self.clone()))
    }
}

/// A host value the engine cannot look inside.
///
/// Opaque handles may be shared freely but never structurally copied; a
/// clone that has to copy one fails with `CowError::Unclonable`.
#[derive(Clone)]
pub struct OpaqueHandle {
    type_name: Rc<str>,
    inner: Rc<dyn Any>,
}

impl OpaqueHandle {
    /// Wrap a host value under a display type name.
    pub fn new<T: Any>(type_name: impl AsRef<str>, value: T) -> Self {
        Self {
            type_name: Rc::from(type_name.as_ref()),
            inner: Rc::new(value),
        }
    }

    /// Display type name of the host value
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Borrow the host value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check whether two handles point at the same host value.
    pub fn ptr_eq(&self, other: &OpaqueHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}
