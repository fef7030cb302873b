//! logos-based markup tokenizer.
//!
//! Markup needs two lexers: one for character data between tags, one for the
//! inside of a tag where whitespace separates names and quoted values. The
//! content lexer [`morph`](logos::Lexer::morph)s into the tag lexer after `<`
//! or `</` and back after `>` or `/>`.
//!
//! Comments, processing instructions and `<!DOCTYPE ...>` are consumed by
//! callbacks and never reach the parser. Entities in text and attribute values
//! are decoded here.

use logos::{Lexer, Logos};

use super::parser::MarkupError;

/// Tokens between tags.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum ContentToken {
    /// `<!-- ... -->`
    #[token("<!--", |lex| skip_past(lex, "-->"))]
    Comment,

    /// `<![CDATA[ ... ]]>`, carrying the raw section body.
    #[token("<![CDATA[", cdata)]
    Cdata(String),

    /// `<? ... ?>`
    #[token("<?", |lex| skip_past(lex, "?>"))]
    Instruction,

    /// `<!DOCTYPE ...>` and other declarations.
    #[token("<!", |lex| skip_past(lex, ">"))]
    Declaration,

    /// `</`
    #[token("</")]
    CloseTagOpen,

    /// `<`
    #[token("<")]
    TagOpen,

    /// Character data, entities still encoded.
    #[regex(r"[^<]+")]
    Text,
}

/// Tokens inside a tag.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TagToken {
    /// Tag or attribute name, optionally prefixed: `button`, `bind:text`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*(:[A-Za-z_][A-Za-z0-9_.\-]*)?")]
    Name,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Quoted,

    #[token("/>")]
    SelfClose,

    #[token(">")]
    Close,
}

fn skip_past(lex: &mut Lexer<ContentToken>, terminator: &str) -> bool {
    match lex.remainder().find(terminator) {
        Some(offset) => {
            lex.bump(offset + terminator.len());
            true
        }
        None => false,
    }
}

fn cdata(lex: &mut Lexer<ContentToken>) -> Option<String> {
    let offset = lex.remainder().find("]]>")?;
    let body = lex.remainder()[..offset].to_owned();
    lex.bump(offset + 3);
    Some(body)
}

/// A token as the parser sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken {
    /// Decoded character data (including CDATA bodies).
    Text(String),
    TagOpen,
    CloseTagOpen,
    Name(String),
    Equals,
    /// Decoded attribute value, quotes removed.
    Value(String),
    SelfClose,
    TagClose,
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: MarkupToken,
    pub position: usize,
}

/// Tokenize markup into parser tokens.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, MarkupError> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(input);

    while let Some(result) = content.next() {
        let position = content.span().start;
        let token = result.map_err(|()| MarkupError::Lex { position })?;
        match token {
            ContentToken::Comment | ContentToken::Instruction | ContentToken::Declaration => {}
            ContentToken::Cdata(body) => tokens.push(Spanned {
                token: MarkupToken::Text(body),
                position,
            }),
            ContentToken::Text => tokens.push(Spanned {
                token: MarkupToken::Text(decode_entities(content.slice(), position)?),
                position,
            }),
            ContentToken::TagOpen | ContentToken::CloseTagOpen => {
                let opener = if token == ContentToken::TagOpen {
                    MarkupToken::TagOpen
                } else {
                    MarkupToken::CloseTagOpen
                };
                tokens.push(Spanned {
                    token: opener,
                    position,
                });

                let mut tag = content.morph::<TagToken>();
                loop {
                    let Some(result) = tag.next() else {
                        return Err(MarkupError::UnexpectedEof("unterminated tag".into()));
                    };
                    let position = tag.span().start;
                    let token = result.map_err(|()| MarkupError::Lex { position })?;
                    let (token, done) = match token {
                        TagToken::Name => (MarkupToken::Name(tag.slice().to_owned()), false),
                        TagToken::Equals => (MarkupToken::Equals, false),
                        TagToken::Quoted => {
                            let slice = tag.slice();
                            let raw = &slice[1..slice.len() - 1];
                            (MarkupToken::Value(decode_entities(raw, position + 1)?), false)
                        }
                        TagToken::SelfClose => (MarkupToken::SelfClose, true),
                        TagToken::Close => (MarkupToken::TagClose, true),
                    };
                    tokens.push(Spanned { token, position });
                    if done {
                        break;
                    }
                }
                content = tag.morph();
            }
        }
    }

    Ok(tokens)
}

/// Decode the predefined entities and numeric character references.
///
/// `position` is the byte offset of `raw` in the source, for error reporting.
pub fn decode_entities(raw: &str, position: usize) -> Result<String, MarkupError> {
    if !raw.contains('&') {
        return Ok(raw.to_owned());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let entity_position = position + (raw.len() - rest.len()) + amp;
        let invalid = |entity: &str| MarkupError::InvalidEntity {
            position: entity_position,
            entity: entity.to_owned(),
        };

        let Some(semi) = after.find(';') else {
            return Err(invalid(after));
        };
        let name = &after[..semi];
        let decoded = match name {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = name.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32).ok_or_else(|| invalid(name))?
            }
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
