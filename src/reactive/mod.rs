//! Reactive cells: typed values with change listeners.
//!
//! - [`Reactive`]: a single typed value; `set` notifies listeners unless the
//!   new value equals the current one.
//! - [`ReactiveList`]: an ordered container notifying on structural change.
//! - [`StateValue`]: the scalar kinds a state store can hold.

pub mod cell;
pub mod list;
pub mod value;

pub use cell::{ListenerId, Reactive, Subscription};
pub use list::{ListError, ReactiveList};
pub use value::{CellKind, StateValue, Uri};
