//! logos-based delimiter lexer for template strings.
//!
//! Longest match wins, so `{{` beats `{` and `}}` beats `}`. Every input
//! byte belongs to some token: runs without braces are [`Delimiter::Text`] and
//! lone braces are [`Delimiter::Brace`].

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `{{`
    #[token("{{")]
    Open,

    /// `}}`
    #[token("}}")]
    Close,

    /// A single `{` or `}` that is not part of a delimiter.
    #[token("{")]
    #[token("}")]
    Brace,

    /// Anything without braces.
    #[regex(r"[^{}]+")]
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<(Delimiter, &str)> {
        let mut lexer = Delimiter::lexer(input);
        let mut out = Vec::new();
        while let Some(result) = lexer.next() {
            out.push((result.expect("every byte is lexable"), lexer.slice()));
        }
        out
    }

    #[test]
    fn placeholder_tokens() {
        assert_eq!(
            lex("Hi {{ name }}!"),
            vec![
                (Delimiter::Text, "Hi "),
                (Delimiter::Open, "{{"),
                (Delimiter::Text, " name "),
                (Delimiter::Close, "}}"),
                (Delimiter::Text, "!"),
            ]
        );
    }

    #[test]
    fn triple_brace_prefers_delimiter_first() {
        assert_eq!(
            lex("{{{"),
            vec![(Delimiter::Open, "{{"), (Delimiter::Brace, "{")]
        );
    }

    #[test]
    fn lone_braces_are_brace_tokens() {
        assert_eq!(
            lex("a{b}c"),
            vec![
                (Delimiter::Text, "a"),
                (Delimiter::Brace, "{"),
                (Delimiter::Text, "b"),
                (Delimiter::Brace, "}"),
                (Delimiter::Text, "c"),
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(lex("").is_empty());
    }
}
