//! Value kinds a state cell can hold.
//!
//! Every scalar kind implements [`StateValue`], which ties the Rust type to its
//! [`CellKind`] tag and to the matching [`StoredCell`] variant so the store can
//! recover a typed handle from its type-erased map.

use std::fmt;

use super::cell::Reactive;
use crate::state::StoredCell;

// ---------------------------------------------------------------------------
// CellKind
// ---------------------------------------------------------------------------

/// Discriminant for the value kinds the state store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Bool,
    Bytes,
    Float,
    Int,
    String,
    Uri,
    List,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Float => "float",
            Self::Int => "int",
            Self::String => "string",
            Self::Uri => "uri",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Uri
// ---------------------------------------------------------------------------

/// A URI held as text. No validation is performed; an empty `Uri` is the
/// zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Uri(String);

impl Uri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme before the first `:`, if any (`"file"` for `file:///tmp`).
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once(':')?;
        let valid = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        valid.then_some(scheme)
    }

    /// The part after `scheme://authority`, or the whole string when there is
    /// no scheme.
    pub fn path(&self) -> &str {
        let Some(scheme) = self.scheme() else {
            return &self.0;
        };
        let rest = &self.0[scheme.len() + 1..];
        match rest.strip_prefix("//") {
            Some(authority_and_path) => authority_and_path
                .find('/')
                .map_or("", |slash| &authority_and_path[slash..]),
            None => rest,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// StateValue
// ---------------------------------------------------------------------------

/// A scalar type that can live in a [`Reactive`] cell inside the state store.
///
/// `Default` supplies the zero value used for freshly created cells and for
/// the "no literal given" check in attribute binding.
pub trait StateValue: Clone + PartialEq + Default + fmt::Debug + 'static {
    const KIND: CellKind;

    /// Erase a typed handle for storage.
    fn into_stored(cell: Reactive<Self>) -> StoredCell;

    /// Recover a typed handle, or `None` if the stored cell has another kind.
    fn from_stored(cell: &StoredCell) -> Option<Reactive<Self>>;

    /// Whether this is the zero value of the type.
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

macro_rules! state_value {
    ($ty:ty, $variant:ident) => {
        impl StateValue for $ty {
            const KIND: CellKind = CellKind::$variant;

            fn into_stored(cell: Reactive<Self>) -> StoredCell {
                StoredCell::$variant(cell)
            }

            fn from_stored(cell: &StoredCell) -> Option<Reactive<Self>> {
                match cell {
                    StoredCell::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

state_value!(bool, Bool);
state_value!(Vec<u8>, Bytes);
state_value!(f64, Float);
state_value!(i64, Int);
state_value!(String, String);
state_value!(Uri, Uri);
