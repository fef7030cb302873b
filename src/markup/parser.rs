//! Recursive descent markup parser.
//!
//! Parses markup text into a [`Markup`] tree. Uses the logos-based tokenizer
//! from [`crate::markup::tokenizer`]. A document has exactly one root element;
//! only whitespace may surround it.

use super::node::{Attribute, NodeData, NodeId};
use super::tokenizer::{tokenize, MarkupToken, Spanned};
use super::tree::Markup;

/// Deepest element nesting a document may use.
pub const MAX_DEPTH: usize = 128;

/// Errors from markup parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("mismatched closing tag at position {position}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("invalid entity `&{entity};` at position {position}")]
    InvalidEntity { position: usize, entity: String },
    #[error("unrecognized input at position {position}")]
    Lex { position: usize },
    #[error("elements nested deeper than {limit} levels at position {position}")]
    TooDeep { position: usize, limit: usize },
}

/// Parse a markup string. Attributes prefixed with `bind_namespace:` are
/// bind declarations.
pub fn parse_markup(input: &str, bind_namespace: &str) -> Result<Markup, MarkupError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        tree: Markup::new(bind_namespace),
    };

    parser.skip_whitespace()?;
    if parser.is_eof() {
        return Err(MarkupError::UnexpectedEof("document has no root element".into()));
    }
    parser.parse_element(None, 1)?;
    parser.skip_whitespace()?;
    if let Some(tok) = parser.peek() {
        return Err(MarkupError::UnexpectedToken {
            position: tok.position,
            message: "content after the root element".into(),
        });
    }

    Ok(parser.tree)
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    tree: Markup,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn unexpected(tok: &Spanned, expected: &str) -> MarkupError {
        MarkupError::UnexpectedToken {
            position: tok.position,
            message: format!("expected {expected}, got {:?}", tok.token),
        }
    }

    fn expect(&mut self, expected: MarkupToken) -> Result<(), MarkupError> {
        match self.advance() {
            Some(tok) if tok.token == expected => Ok(()),
            Some(tok) => Err(Self::unexpected(&tok, &format!("{expected:?}"))),
            None => Err(MarkupError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    fn expect_name(&mut self) -> Result<(String, usize), MarkupError> {
        match self.advance() {
            Some(Spanned {
                token: MarkupToken::Name(name),
                position,
            }) => Ok((name, position)),
            Some(tok) => Err(Self::unexpected(&tok, "a name")),
            None => Err(MarkupError::UnexpectedEof("expected a name".into())),
        }
    }

    /// Skip whitespace-only text outside the root element.
    fn skip_whitespace(&mut self) -> Result<(), MarkupError> {
        while let Some(tok) = self.peek() {
            match &tok.token {
                MarkupToken::Text(text) if text.trim().is_empty() => self.cursor += 1,
                MarkupToken::Text(_) => {
                    return Err(MarkupError::UnexpectedToken {
                        position: tok.position,
                        message: "text outside the root element".into(),
                    })
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// element := '<' Name attribute* ( '/>' | '>' content* '</' Name '>' )
    fn parse_element(&mut self, parent: Option<NodeId>, depth: usize) -> Result<NodeId, MarkupError> {
        if depth > MAX_DEPTH {
            return Err(MarkupError::TooDeep {
                position: self.peek().map_or(0, |tok| tok.position),
                limit: MAX_DEPTH,
            });
        }
        self.expect(MarkupToken::TagOpen)?;
        let (name, _) = self.expect_name()?;
        let mut data = NodeData::new(name.clone());

        let self_closing = loop {
            match self.advance() {
                Some(Spanned {
                    token: MarkupToken::Name(attr_name),
                    ..
                }) => {
                    self.expect(MarkupToken::Equals)?;
                    let value = self.parse_value()?;
                    data.attributes.push(split_attribute(&attr_name, value));
                }
                Some(Spanned {
                    token: MarkupToken::SelfClose,
                    ..
                }) => break true,
                Some(Spanned {
                    token: MarkupToken::TagClose,
                    ..
                }) => break false,
                Some(tok) => return Err(Self::unexpected(&tok, "an attribute or end of tag")),
                None => return Err(MarkupError::UnexpectedEof(format!("unterminated <{name}>"))),
            }
        };

        let id = match parent {
            Some(parent) => self.tree.insert_child(parent, data),
            None => self.tree.insert(data),
        };
        if self_closing {
            return Ok(id);
        }

        loop {
            let Some(tok) = self.advance() else {
                return Err(MarkupError::UnexpectedEof(format!("unclosed <{name}>")));
            };
            match tok.token {
                MarkupToken::Text(text) => {
                    if let Some(node) = self.tree.get_mut(id) {
                        node.content.push_str(&text);
                    }
                }
                MarkupToken::TagOpen => {
                    self.cursor -= 1;
                    self.parse_element(Some(id), depth + 1)?;
                }
                MarkupToken::CloseTagOpen => {
                    let (found, position) = self.expect_name()?;
                    if !found.eq_ignore_ascii_case(&name) {
                        return Err(MarkupError::MismatchedTag {
                            position,
                            expected: name,
                            found,
                        });
                    }
                    self.expect(MarkupToken::TagClose)?;
                    return Ok(id);
                }
                _ => return Err(Self::unexpected(&tok, "content or a closing tag")),
            }
        }
    }

    fn parse_value(&mut self) -> Result<String, MarkupError> {
        match self.advance() {
            Some(Spanned {
                token: MarkupToken::Value(value),
                ..
            }) => Ok(value),
            Some(tok) => Err(Self::unexpected(&tok, "a quoted value")),
            None => Err(MarkupError::UnexpectedEof("expected a quoted value".into())),
        }
    }
}

/// `bind:text` ⇒ namespace `bind`, name `text`.
fn split_attribute(raw: &str, value: String) -> Attribute {
    match raw.split_once(':') {
        Some((namespace, name)) => Attribute::namespaced(namespace, name, value),
        None => Attribute::new(raw, value),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::markup::NodeRef;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Rc<Markup> {
        Rc::new(parse_markup(input, "bind").unwrap())
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "<col>".repeat(depth), "</col>".repeat(depth))
    }

    #[test]
    fn nesting_at_limit_parses() {
        assert!(parse_markup(&nested(MAX_DEPTH), "bind").is_ok());
    }

    #[test]
    fn nesting_past_limit_fails() {
        let err = parse_markup(&nested(MAX_DEPTH + 1), "bind").unwrap_err();
        assert_eq!(
            err,
            MarkupError::TooDeep {
                position: MAX_DEPTH * "<col>".len(),
                limit: MAX_DEPTH,
            }
        );
        assert!(parse_markup(&nested(100_000), "bind").is_err());
    }

    #[test]
    fn parse_nested_document() {
        let tree = parse(
            r#"<?xml version="1.0"?>
            <col>
                <!-- header -->
                <text color="red">Title</text>
                <row><button bind:click="save">Save</button></row>
            </col>"#,
        );
        let root = NodeRef::root(&tree).unwrap();
        assert_eq!(root.tag(), "col");
        let children: Vec<String> = root.children().map(|c| c.tag()).collect();
        assert_eq!(children, vec!["text", "row"]);

        let text = root.children().next().unwrap();
        assert_eq!(text.attr("color"), "red");
        assert_eq!(text.content(), "Title");

        let button = root.children().nth(1).unwrap().children().next().unwrap();
        assert_eq!(button.bind("click"), "save");
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn closing_tag_is_case_insensitive() {
        let tree = parse("<Text>hi</TEXT>");
        assert_eq!(NodeRef::root(&tree).unwrap().tag(), "text");
    }

    #[test]
    fn content_spans_child_elements() {
        let tree = parse("<text>Hello <b/>world</text>");
        assert_eq!(NodeRef::root(&tree).unwrap().content(), "Hello world");
    }

    #[test]
    fn custom_bind_namespace() {
        let tree = Rc::new(parse_markup(r#"<text x:content="name"/>"#, "x").unwrap());
        let root = NodeRef::root(&tree).unwrap();
        assert!(root.has_bind("content"));
        assert_eq!(root.bind("content"), "name");
    }

    #[test]
    fn mismatched_tag() {
        let err = parse_markup("<col><row></col>", "bind").unwrap_err();
        assert_eq!(
            err,
            MarkupError::MismatchedTag {
                position: 12,
                expected: "row".into(),
                found: "col".into(),
            }
        );
    }

    #[test]
    fn unclosed_element_is_eof() {
        assert!(matches!(
            parse_markup("<col><row/>", "bind"),
            Err(MarkupError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn empty_document_is_eof() {
        assert!(matches!(
            parse_markup("  \n ", "bind"),
            Err(MarkupError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn multiple_roots_rejected() {
        assert!(matches!(
            parse_markup("<a/><b/>", "bind"),
            Err(MarkupError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn stray_text_rejected() {
        assert!(matches!(
            parse_markup("oops <a/>", "bind"),
            Err(MarkupError::UnexpectedToken { position: 0, .. })
        ));
    }

    #[test]
    fn attribute_without_value_rejected() {
        assert!(parse_markup("<input disabled/>", "bind").is_err());
    }

    #[test]
    fn error_messages() {
        let err = MarkupError::MismatchedTag {
            position: 3,
            expected: "a".into(),
            found: "b".into(),
        };
        assert_eq!(
            err.to_string(),
            "mismatched closing tag at position 3: expected </a>, found </b>"
        );
    }
}
