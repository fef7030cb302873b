//! State store: named reactive cells of mixed kinds.
//!
//! A [`State`] maps bind names to type-erased [`StoredCell`]s. Typed accessors
//! create a zero-valued cell on first use and recover the typed handle on
//! later lookups. Reusing a name with a different kind is an authoring error
//! and is reported as [`StateError::TypeMismatch`].
//!
//! `State` is a shared handle: clones see the same map. [`State::fork`]
//! layers an empty map over the live parent. Lookups that miss the fork's own
//! map resolve in the parent, so names the parent creates after the fork are
//! still visible, and only names placed with [`State::shadow`] are private to
//! the fork. This is how list rows see item fields locally and everything
//! else from the document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::reactive::{CellKind, Reactive, ReactiveList, StateValue, Uri};

/// Errors from typed state lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("state `{name}` is bound as {existing}, cannot access it as {requested}")]
    TypeMismatch {
        name: String,
        existing: CellKind,
        requested: CellKind,
    },
}

// ---------------------------------------------------------------------------
// StoredCell
// ---------------------------------------------------------------------------

/// A type-erased cell as held by the store.
#[derive(Debug, Clone)]
pub enum StoredCell {
    Bool(Reactive<bool>),
    Bytes(Reactive<Vec<u8>>),
    Float(Reactive<f64>),
    Int(Reactive<i64>),
    String(Reactive<String>),
    Uri(Reactive<Uri>),
    List(ReactiveList<Value>),
}

impl StoredCell {
    pub fn kind(&self) -> CellKind {
        match self {
            Self::Bool(_) => CellKind::Bool,
            Self::Bytes(_) => CellKind::Bytes,
            Self::Float(_) => CellKind::Float,
            Self::Int(_) => CellKind::Int,
            Self::String(_) => CellKind::String,
            Self::Uri(_) => CellKind::Uri,
            Self::List(_) => CellKind::List,
        }
    }

    /// Same underlying cell, fresh listener bookkeeping.
    fn alias(&self) -> Self {
        match self {
            Self::Bool(cell) => Self::Bool(cell.alias()),
            Self::Bytes(cell) => Self::Bytes(cell.alias()),
            Self::Float(cell) => Self::Float(cell.alias()),
            Self::Int(cell) => Self::Int(cell.alias()),
            Self::String(cell) => Self::String(cell.alias()),
            Self::Uri(cell) => Self::Uri(cell.alias()),
            Self::List(list) => Self::List(list.alias()),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

type CellMap = HashMap<String, StoredCell>;

#[derive(Default)]
struct StateInner {
    cells: RefCell<CellMap>,
    parent: Option<State>,
}

/// The per-document state store.
#[derive(Clone, Default)]
pub struct State {
    inner: Rc<StateInner>,
}

/// A non-owning reference to a [`State`], for listeners that must not keep
/// the store alive.
#[derive(Clone)]
pub struct WeakState {
    inner: Weak<StateInner>,
}

impl WeakState {
    pub fn upgrade(&self) -> Option<State> {
        self.inner.upgrade().map(|inner| State { inner })
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("names", &self.names())
            .field("forked", &self.inner.parent.is_some())
            .finish()
    }
}

fn mismatch(name: &str, existing: &StoredCell, requested: CellKind) -> StateError {
    StateError::TypeMismatch {
        name: name.to_owned(),
        existing: existing.kind(),
        requested,
    }
}

impl State {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downgrade(&self) -> WeakState {
        WeakState {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// An empty store layered over this one.
    ///
    /// Lookups fall through to the live parent, so writes reach the parent's
    /// cells and names the parent gains later are visible. Handles obtained
    /// through the fork are aliases with their own listener bookkeeping.
    pub fn fork(&self) -> Self {
        Self {
            inner: Rc::new(StateInner {
                cells: RefCell::new(CellMap::new()),
                parent: Some(self.clone()),
            }),
        }
    }

    /// Whether `name` resolves in this store or any store it was forked from.
    pub fn has(&self, name: &str) -> bool {
        self.inner.cells.borrow().contains_key(name)
            || self.inner.parent.as_ref().is_some_and(|parent| parent.has(name))
    }

    /// Whether `name` is held by this store itself rather than a parent.
    pub fn has_local(&self, name: &str) -> bool {
        self.inner.cells.borrow().contains_key(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<CellKind> {
        if let Some(cell) = self.inner.cells.borrow().get(name) {
            return Some(cell.kind());
        }
        self.inner.parent.as_ref().and_then(|parent| parent.kind_of(name))
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All resolvable names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self
            .inner
            .parent
            .as_ref()
            .map(State::names)
            .unwrap_or_default();
        names.extend(self.inner.cells.borrow().keys().cloned());
        names.sort();
        names.dedup();
        names
    }

    /// Names held by this store itself, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.cells.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop `name` from this store only. Parent entries and cells aliased
    /// elsewhere are unaffected. Returns the kind that was removed.
    pub fn detach(&self, name: &str) -> Option<CellKind> {
        self.inner.cells.borrow_mut().remove(name).map(|cell| cell.kind())
    }

    /// Drop `name` from the nearest store in the chain that holds it.
    pub fn remove(&self, name: &str) -> Option<CellKind> {
        match self.detach(name) {
            Some(kind) => Some(kind),
            None => self.inner.parent.as_ref().and_then(|parent| parent.remove(name)),
        }
    }

    /// The cell stored under `name`, created zero-valued if absent.
    ///
    /// In a fork, a name the fork does not hold resolves in the parent and is
    /// created there when no store in the chain has it.
    pub fn get<T: StateValue>(&self, name: &str) -> Result<Reactive<T>, StateError> {
        if let Some(existing) = self.inner.cells.borrow().get(name) {
            return T::from_stored(existing).ok_or_else(|| mismatch(name, existing, T::KIND));
        }
        if let Some(parent) = &self.inner.parent {
            return parent.get::<T>(name).map(|cell| cell.alias());
        }
        let cell = Reactive::new(T::default());
        self.inner
            .cells
            .borrow_mut()
            .insert(name.to_owned(), T::into_stored(cell.clone()));
        Ok(cell)
    }

    /// Place a new cell holding `value` under `name` in this store only,
    /// replacing any local entry and hiding any parent entry of that name.
    pub fn shadow<T: StateValue>(&self, name: &str, value: T) -> Reactive<T> {
        let cell = Reactive::new(value);
        self.inner
            .cells
            .borrow_mut()
            .insert(name.to_owned(), T::into_stored(cell.clone()));
        cell
    }

    /// `get(name)` followed by `set(value)`; returns the cell.
    pub fn set<T: StateValue>(&self, name: &str, value: T) -> Result<Reactive<T>, StateError> {
        let cell = self.get::<T>(name)?;
        cell.set(value);
        Ok(cell)
    }

    pub fn get_bool(&self, name: &str) -> Result<Reactive<bool>, StateError> {
        self.get(name)
    }

    pub fn bool(&self, name: &str, value: bool) -> Result<Reactive<bool>, StateError> {
        self.set(name, value)
    }

    pub fn get_bytes(&self, name: &str) -> Result<Reactive<Vec<u8>>, StateError> {
        self.get(name)
    }

    pub fn bytes(&self, name: &str, value: Vec<u8>) -> Result<Reactive<Vec<u8>>, StateError> {
        self.set(name, value)
    }

    pub fn get_float(&self, name: &str) -> Result<Reactive<f64>, StateError> {
        self.get(name)
    }

    pub fn float(&self, name: &str, value: f64) -> Result<Reactive<f64>, StateError> {
        self.set(name, value)
    }

    pub fn get_int(&self, name: &str) -> Result<Reactive<i64>, StateError> {
        self.get(name)
    }

    pub fn int(&self, name: &str, value: i64) -> Result<Reactive<i64>, StateError> {
        self.set(name, value)
    }

    pub fn get_string(&self, name: &str) -> Result<Reactive<String>, StateError> {
        self.get(name)
    }

    pub fn string(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Reactive<String>, StateError> {
        self.set(name, value.into())
    }

    pub fn get_uri(&self, name: &str) -> Result<Reactive<Uri>, StateError> {
        self.get(name)
    }

    pub fn uri(&self, name: &str, value: impl Into<Uri>) -> Result<Reactive<Uri>, StateError> {
        self.set(name, value.into())
    }

    /// The list stored under `name`, created empty if absent. Resolves
    /// through parents like [`State::get`].
    pub fn get_list(&self, name: &str) -> Result<ReactiveList<Value>, StateError> {
        match self.inner.cells.borrow().get(name) {
            Some(StoredCell::List(list)) => return Ok(list.clone()),
            Some(other) => return Err(mismatch(name, other, CellKind::List)),
            None => {}
        }
        if let Some(parent) = &self.inner.parent {
            return parent.get_list(name).map(|list| list.alias());
        }
        let list = ReactiveList::default();
        self.inner
            .cells
            .borrow_mut()
            .insert(name.to_owned(), StoredCell::List(list.clone()));
        Ok(list)
    }

    pub fn list(&self, name: &str, items: Vec<Value>) -> Result<ReactiveList<Value>, StateError> {
        let list = self.get_list(name)?;
        list.set(items);
        Ok(list)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_store_is_valid() {
        let state = State::new();
        assert!(state.is_empty());
        assert!(!state.has("anything"));
    }

    #[test]
    fn get_creates_zero_valued_cell() {
        let state = State::new();
        let cell = state.get_int("count").unwrap();
        assert_eq!(cell.get(), 0);
        assert!(state.has("count"));
        assert_eq!(state.kind_of("count"), Some(CellKind::Int));
    }

    #[test]
    fn get_returns_same_cell() {
        let state = State::new();
        let first = state.get_string("name").unwrap();
        let second = state.get_string("name").unwrap();
        assert!(first.same_cell(&second));
    }

    #[test]
    fn set_then_get_through_store() {
        let state = State::new();
        state.string("name", "World").unwrap();
        state.bool("flag", true).unwrap();
        state.float("ratio", 0.5).unwrap();
        state.bytes("blob", vec![1, 2]).unwrap();
        state.uri("home", "https://example.com").unwrap();

        assert_eq!(state.get_string("name").unwrap().get(), "World");
        assert!(state.get_bool("flag").unwrap().get());
        assert_eq!(state.get_float("ratio").unwrap().get(), 0.5);
        assert_eq!(state.get_bytes("blob").unwrap().get(), vec![1, 2]);
        assert_eq!(
            state.get_uri("home").unwrap().get(),
            Uri::new("https://example.com")
        );
    }

    #[test]
    fn type_mismatch_is_reported() {
        let state = State::new();
        state.int("count", 3).unwrap();
        let err = state.get_string("count").unwrap_err();
        assert_eq!(
            err,
            StateError::TypeMismatch {
                name: "count".into(),
                existing: CellKind::Int,
                requested: CellKind::String,
            }
        );
        assert_eq!(
            err.to_string(),
            "state `count` is bound as int, cannot access it as string"
        );
    }

    #[test]
    fn list_kind_mismatch() {
        let state = State::new();
        state.string("items", "x").unwrap();
        assert!(state.get_list("items").is_err());

        state.list("rows", vec![json!(1)]).unwrap();
        assert!(state.get_int("rows").is_err());
    }

    #[test]
    fn list_round_trip() {
        let state = State::new();
        state
            .list("todos", vec![json!({"title": "a"}), json!({"title": "b"})])
            .unwrap();
        let list = state.get_list("todos").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get_value(1).unwrap(), json!({"title": "b"}));
    }

    #[test]
    fn clones_share_map() {
        let state = State::new();
        let other = state.clone();
        other.string("shared", "yes").unwrap();
        assert!(state.has("shared"));
    }

    #[test]
    fn fork_aliases_existing_cells() {
        let parent = State::new();
        parent.string("title", "Parent").unwrap();
        let fork = parent.fork();

        fork.string("title", "Changed").unwrap();
        assert_eq!(parent.get_string("title").unwrap().get(), "Changed");
    }

    #[test]
    fn fork_sees_names_created_after_fork() {
        let parent = State::new();
        let fork = parent.fork();
        parent.string("filter", "done").unwrap();

        assert!(fork.has("filter"));
        assert_eq!(fork.kind_of("filter"), Some(CellKind::String));
        assert_eq!(fork.get_string("filter").unwrap().get(), "done");
    }

    #[test]
    fn fork_lookup_creates_in_parent() {
        let parent = State::new();
        let fork = parent.fork();
        let row_cell = fork.get_string("filter").unwrap();
        assert!(parent.has("filter"));
        assert!(!fork.has_local("filter"));

        parent.string("filter", "done").unwrap();
        assert_eq!(row_cell.get(), "done");
    }

    #[test]
    fn fork_reacts_to_later_parent_writes() {
        let parent = State::new();
        let fork = parent.fork();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        fork.get_string("filter")
            .unwrap()
            .on_change(move |v| sink.borrow_mut().push(v.clone()));

        parent.string("filter", "done").unwrap();
        assert_eq!(*seen.borrow(), vec!["done".to_string()]);
    }

    #[test]
    fn shadow_stays_local() {
        let parent = State::new();
        let fork = parent.fork();
        fork.shadow("row", "local".to_string());
        assert!(fork.has_local("row"));
        assert!(!parent.has("row"));
        assert_eq!(fork.local_names(), vec!["row".to_string()]);
    }

    #[test]
    fn fork_type_mismatch_resolves_through_parent() {
        let parent = State::new();
        parent.int("n", 1).unwrap();
        let fork = parent.fork();
        assert!(matches!(
            fork.get_string("n"),
            Err(StateError::TypeMismatch { existing: CellKind::Int, .. })
        ));
        assert!(fork.get_list("n").is_err());
    }

    #[test]
    fn fork_listeners_clear_independently() {
        let parent = State::new();
        let parent_cell = parent.get_string("title").unwrap();
        parent_cell.on_change(|_| {});
        let fork = parent.fork();
        let fork_cell = fork.get_string("title").unwrap();
        fork_cell.on_change(|_| {});

        fork_cell.clear_listeners();
        assert_eq!(parent_cell.listener_count(), 1);
    }

    #[test]
    fn shadow_hides_parent_name_until_detached() {
        let parent = State::new();
        parent.string("name", "parent").unwrap();
        let fork = parent.fork();
        fork.shadow("name", "row".to_string());
        fork.string("name", "edited").unwrap();

        assert_eq!(parent.get_string("name").unwrap().get(), "parent");
        assert_eq!(fork.get_string("name").unwrap().get(), "edited");

        assert_eq!(fork.detach("name"), Some(CellKind::String));
        assert_eq!(fork.get_string("name").unwrap().get(), "parent");
        assert_eq!(fork.detach("name"), None);
    }

    #[test]
    fn remove_reaches_parent() {
        let parent = State::new();
        parent.get_int("n").unwrap();
        let fork = parent.fork();
        fork.shadow("n", 2_i64);

        assert_eq!(fork.remove("n"), Some(CellKind::Int));
        assert!(parent.has("n"));
        assert_eq!(fork.remove("n"), Some(CellKind::Int));
        assert!(!parent.has("n"));
        assert_eq!(fork.remove("n"), None);
    }

    #[test]
    fn fork_names_union_parent() {
        let parent = State::new();
        parent.get_int("a").unwrap();
        let fork = parent.fork();
        fork.shadow("b", 0_i64);
        fork.shadow("a", 1_i64);
        assert_eq!(fork.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(fork.len(), 2);
        assert_eq!(parent.names(), vec!["a".to_string()]);
    }

    #[test]
    fn weak_state_upgrade() {
        let state = State::new();
        let weak = state.downgrade();
        assert!(weak.upgrade().is_some());
        drop(state);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn names_are_sorted() {
        let state = State::new();
        state.get_int("b").unwrap();
        state.get_int("a").unwrap();
        assert_eq!(state.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(state.len(), 2);
    }
}
