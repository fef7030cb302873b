//! `ReactiveList<T>`: an ordered reactive container.
//!
//! Structural changes (`append`, `prepend`, `remove`, `set`, `set_value`)
//! notify listeners with the full item slice. Index reads and writes are
//! bounds-checked and report [`ListError`] rather than substituting a zero
//! value.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::cell::{dispatch, Listener, ListenerId, Listeners, Subscription};

/// Errors from indexed list access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("list index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

struct ListInner<T: 'static> {
    items: Vec<T>,
    /// Bumped on every structural change.
    generation: u64,
    listeners: Listeners<[T]>,
}

/// Ordered, reactive list of `T`.
pub struct ReactiveList<T: 'static> {
    inner: Rc<RefCell<ListInner<T>>>,
    owned: Rc<RefCell<Vec<ListenerId>>>,
}

impl<T: 'static> Clone for ReactiveList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            owned: Rc::clone(&self.owned),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for ReactiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ReactiveList")
            .field("items", &inner.items)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: 'static> Default for ReactiveList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: 'static> ReactiveList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                items,
                generation: 0,
                listeners: Listeners::new(),
            })),
            owned: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A new handle onto the same items with its own listener bookkeeping.
    pub fn alias(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            owned: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Register `callback` for every future structural change.
    pub fn on_change(&self, callback: impl FnMut(&[T]) + 'static) -> ListenerId {
        let listener: Listener<[T]> = Rc::new(RefCell::new(callback));
        let id = self.inner.borrow_mut().listeners.add(listener);
        self.owned.borrow_mut().push(id);
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.owned.borrow_mut().retain(|owned| *owned != id);
        self.inner.borrow_mut().listeners.remove(id)
    }

    /// Remove every listener registered through this handle.
    pub fn clear_listeners(&self) {
        let ids: Vec<ListenerId> = self.owned.borrow_mut().drain(..).collect();
        let mut inner = self.inner.borrow_mut();
        for id in ids {
            inner.listeners.remove(id);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn subscription(&self, id: ListenerId) -> Subscription {
        let inner: Weak<RefCell<ListInner<T>>> = Rc::downgrade(&self.inner);
        let owned = Rc::downgrade(&self.owned);
        Subscription::new(move || {
            if let Some(owned) = owned.upgrade() {
                owned.borrow_mut().retain(|entry| *entry != id);
            }
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().listeners.remove(id);
            }
        })
    }
}

impl<T: Clone + PartialEq + 'static> ReactiveList<T> {
    /// A copy of all items.
    pub fn get(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    pub fn get_value(&self, index: usize) -> Result<T, ListError> {
        let inner = self.inner.borrow();
        inner
            .items
            .get(index)
            .cloned()
            .ok_or(ListError::IndexOutOfRange {
                index,
                len: inner.items.len(),
            })
    }

    pub fn append(&self, value: T) {
        self.mutate(|items| {
            items.push(value);
            true
        });
    }

    pub fn prepend(&self, value: T) {
        self.mutate(|items| {
            items.insert(0, value);
            true
        });
    }

    /// Remove the first item equal to `value`. No-op if absent.
    pub fn remove(&self, value: &T) {
        self.mutate(|items| match items.iter().position(|item| item == value) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        });
    }

    /// Replace all items. Equal contents do not notify.
    pub fn set(&self, items: Vec<T>) {
        self.mutate(|current| {
            if *current == items {
                return false;
            }
            *current = items;
            true
        });
    }

    pub fn set_value(&self, index: usize, value: T) -> Result<(), ListError> {
        let len = self.len();
        if index >= len {
            return Err(ListError::IndexOutOfRange { index, len });
        }
        self.mutate(|items| {
            if items[index] == value {
                return false;
            }
            items[index] = value;
            true
        });
        Ok(())
    }

    /// Apply `change`; notify only if it reports a modification.
    fn mutate(&self, change: impl FnOnce(&mut Vec<T>) -> bool) {
        let (snapshot, listeners, generation) = {
            let mut inner = self.inner.borrow_mut();
            if !change(&mut inner.items) {
                return;
            }
            inner.generation += 1;
            (inner.items.clone(), inner.listeners.snapshot(), inner.generation)
        };
        dispatch(snapshot.as_slice(), &listeners, || {
            self.inner
                .try_borrow()
                .is_ok_and(|inner| inner.generation != generation)
        });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
