//! Ordered clone-listener registry shared by both cell flavors

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener callback invoked with the cell that just committed.
pub type Listener<C> = Rc<dyn Fn(&C)>;

pub(crate) struct ListenerRegistry<C> {
    entries: RefCell<Vec<(ListenerId, Listener<C>)>>,
    next_id: Cell<u64>,
}

impl<C> Default for ListenerRegistry<C> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<C> ListenerRegistry<C> {
    pub(crate) fn add(&self, listener: Listener<C>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Invoke every listener in registration order.
    ///
    /// Dispatch runs over a snapshot, so listeners may (un)register others;
    /// those changes apply from the next dispatch on.
    pub(crate) fn notify(&self, cell: &C) -> usize {
        let snapshot: Vec<Listener<C>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in &snapshot {
            listener(cell);
        }
        snapshot.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let registry: ListenerRegistry<RefCell<Vec<u32>>> = ListenerRegistry::default();
        registry.add(Rc::new(|log: &RefCell<Vec<u32>>| log.borrow_mut().push(1)));
        registry.add(Rc::new(|log: &RefCell<Vec<u32>>| log.borrow_mut().push(2)));

        let log = RefCell::new(Vec::new());
        assert_eq!(registry.notify(&log), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_remove() {
        let registry: ListenerRegistry<()> = ListenerRegistry::default();
        let id = registry.add(Rc::new(|_: &()| {}));
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 0);
    }
}
