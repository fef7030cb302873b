//! Test helpers for asserting on rendered widget trees.
//!
//! Use [`tree_to_string`] to capture a tree as indented plain text for
//! snapshot-style assertions.

pub mod snapshot;

pub use snapshot::{document_to_string, tree_to_string};
