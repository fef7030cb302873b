//! Markup documents: tokenizer, parser, and the slotmap-backed node tree.
//!
//! ```text
//! markup text ──► tokenizer (logos, two modes) ──► parser ──► Markup arena
//! ```

pub mod node;
pub mod parser;
pub mod tokenizer;
pub mod tree;

pub use node::{Attribute, NodeData, NodeHandle, NodeId, NodeRef};
pub use parser::{parse_markup, MarkupError, MAX_DEPTH};
pub use tree::Markup;
