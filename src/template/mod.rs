//! `{{name}}` template strings.
//!
//! [`TemplateProgram::compile`] turns a string into literal and placeholder
//! tokens once; [`TemplateProgram::render`] substitutes the live string value
//! of each placeholder from a [`State`](crate::state::State).

pub mod program;
pub mod tokenizer;

pub use program::{TemplateProgram, TemplateToken};
