//! `Reactive<T>`: a typed value cell with change listeners.
//!
//! Cells are single-threaded (`Rc<RefCell<_>>`). A handle is cheap to clone;
//! clones share both the value and the handle's own listener bookkeeping.
//! [`Reactive::alias`] produces a handle onto the same value with separate
//! bookkeeping, which is how forked stores share cells.
//!
//! Dispatch is synchronous and in registration order. No borrow of the cell
//! is held while listeners run, so a listener may read or write any cell. A
//! listener that writes its own cell re-enters `set`; the guards are the
//! equality short-circuit, a skip of listeners that are still running, and a
//! generation check that ends the outer dispatch once a nested `set` has
//! replaced the value, so no listener receives a stale value last.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

// ---------------------------------------------------------------------------
// Listener bookkeeping
// ---------------------------------------------------------------------------

/// Identifies a listener registered on a cell or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type Listener<V> = Rc<RefCell<dyn FnMut(&V)>>;

/// Ordered listener set shared by [`Reactive`] and
/// [`ReactiveList`](super::list::ReactiveList).
pub(crate) struct Listeners<V: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Listener<V>)>,
}

impl<V: ?Sized> Listeners<V> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Listener<V>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Listener<V>> {
        self.entries.iter().map(|(_, l)| Rc::clone(l)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Invoke every listener with `value`, isolating panics.
///
/// A panicking listener is logged and skipped; the value is not rolled back
/// and later listeners still run. Dispatch stops as soon as `superseded`
/// reports that a nested write replaced `value`; that write has already
/// notified the remaining listeners with the newer value.
pub(crate) fn dispatch<V: ?Sized>(
    value: &V,
    listeners: &[Listener<V>],
    superseded: impl Fn() -> bool,
) {
    for listener in listeners {
        if superseded() {
            tracing::trace!("value replaced during dispatch; stopping stale notification");
            return;
        }
        let Ok(mut callback) = listener.try_borrow_mut() else {
            tracing::warn!("listener re-entered while still running; skipping nested notification");
            continue;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(value)));
        if let Err(payload) = outcome {
            tracing::error!(reason = panic_reason(payload.as_ref()), "state listener panicked");
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "<non-string panic payload>"
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A handle that removes one listener when cancelled.
///
/// Dropping a `Subscription` does nothing: listeners stay registered for the
/// lifetime of the cell unless someone cancels them.
pub struct Subscription {
    cancel: Box<dyn FnOnce()>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Remove the listener. No-op if the cell is already gone.
    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Reactive
// ---------------------------------------------------------------------------

struct CellInner<T: 'static> {
    value: T,
    /// Bumped on every accepted `set`.
    generation: u64,
    listeners: Listeners<T>,
}

/// A named state cell's typed handle.
pub struct Reactive<T: 'static> {
    inner: Rc<RefCell<CellInner<T>>>,
    /// Listeners registered through this handle (and its clones).
    owned: Rc<RefCell<Vec<ListenerId>>>,
}

impl<T: 'static> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            owned: Rc::clone(&self.owned),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Reactive")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: Default + 'static> Default for Reactive<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Reactive<T> {
    /// Create a standalone cell holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CellInner {
                value: initial,
                generation: 0,
                listeners: Listeners::new(),
            })),
            owned: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A new handle onto the same value with its own listener bookkeeping.
    ///
    /// `clear_listeners` on the alias leaves this handle's listeners alone.
    pub fn alias(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            owned: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Whether two handles point at the same value.
    pub fn same_cell(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Register `callback` to run on every future change.
    ///
    /// The callback is not invoked for the current value.
    pub fn on_change(&self, callback: impl FnMut(&T) + 'static) -> ListenerId {
        let listener: Listener<T> = Rc::new(RefCell::new(callback));
        let id = self.inner.borrow_mut().listeners.add(listener);
        self.owned.borrow_mut().push(id);
        id
    }

    /// Remove a single listener. Returns `false` if it was not registered.
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

    /// Number of listeners on the cell, across all handles.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// A [`Subscription`] that removes `id` from this cell when cancelled.
    pub fn subscription(&self, id: ListenerId) -> Subscription {
        let inner: Weak<RefCell<CellInner<T>>> = Rc::downgrade(&self.inner);
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

impl<T: Clone + PartialEq + 'static> Reactive<T> {
    /// The current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value and notify listeners.
    ///
    /// Setting a value equal to the current one does nothing.
    pub fn set(&self, value: T) {
        let (snapshot, listeners, generation) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.generation += 1;
            (inner.value.clone(), inner.listeners.snapshot(), inner.generation)
        };
        dispatch(&snapshot, &listeners, || {
            self.inner
                .try_borrow()
                .is_ok_and(|inner| inner.generation != generation)
        });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
