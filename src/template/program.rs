//! Compiled template programs.
//!
//! Compilation scans left to right: text before `{{` is a literal, the text
//! up to the next `}}` (trimmed) names a placeholder, and scanning resumes
//! after `}}`. An opener without a closer turns the rest of the input,
//! opener included, into one literal. Nested and escaped delimiters are not
//! supported.

use std::collections::HashSet;
use std::ops::Range;

use logos::Logos;

use super::tokenizer::Delimiter;
use crate::state::{State, StateError};

/// One compiled template token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Literal(String),
    Placeholder(String),
}

/// An immutable literal/placeholder sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateProgram {
    tokens: Vec<TemplateToken>,
    dependencies: Vec<String>,
}

impl TemplateProgram {
    /// Compile `source`. Never fails; malformed input degrades to literals.
    pub fn compile(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut dependencies = Vec::new();
        let mut literal_start = 0;
        let mut open: Option<Range<usize>> = None;

        let mut lexer = Delimiter::lexer(source);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            match (result, open.clone()) {
                (Ok(Delimiter::Open), None) => {
                    if span.start > literal_start {
                        tokens.push(TemplateToken::Literal(
                            source[literal_start..span.start].to_owned(),
                        ));
                    }
                    open = Some(span);
                }
                (Ok(Delimiter::Close), Some(opener)) => {
                    let name = source[opener.end..span.start].trim().to_owned();
                    dependencies.push(name.clone());
                    tokens.push(TemplateToken::Placeholder(name));
                    literal_start = span.end;
                    open = None;
                }
                // Text, lone braces, a second `{{` inside a placeholder, or a
                // `}}` outside one are all part of the surrounding span.
                _ => {}
            }
        }

        match open {
            Some(opener) => tokens.push(TemplateToken::Literal(source[opener.start..].to_owned())),
            None if literal_start < source.len() => {
                tokens.push(TemplateToken::Literal(source[literal_start..].to_owned()));
            }
            None => {}
        }

        Self {
            tokens,
            dependencies,
        }
    }

    pub fn tokens(&self) -> &[TemplateToken] {
        &self.tokens
    }

    /// One entry per placeholder, in order, duplicates preserved.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Dependency names with duplicates removed, first occurrence order.
    pub fn unique_dependencies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.dependencies
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Whether the program has no placeholders.
    pub fn is_static(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Concatenate literals with the current string value of each placeholder.
    ///
    /// Placeholders always resolve through the string accessor, so a name
    /// bound to another kind is a [`StateError::TypeMismatch`].
    pub fn render(&self, state: &State) -> Result<String, StateError> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                TemplateToken::Literal(text) => out.push_str(text),
                TemplateToken::Placeholder(name) => {
                    state.get_string(name)?.with(|value| out.push_str(value));
                }
            }
        }
        Ok(out)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
