//! Mutable token stream for the minification passes
//!
//! The CST is the analysis structure; the passes themselves rewrite this
//! flat representation: every significant token owns the trivia that
//! precedes it, and a synthetic EOF token owns whatever trails the last
//! real token. Before any pass runs, concatenating the stream reproduces
//! the source exactly.

use super::CsSyntaxKind;
use super::lexer::CsToken;

/// A single piece of trivia (whitespace, newline, comment, directive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: CsSyntaxKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn space() -> Self {
        Self::new(CsSyntaxKind::Whitespace, " ")
    }

    pub fn newline() -> Self {
        Self::new(CsSyntaxKind::Newline, "\n")
    }
}

/// A significant token plus its leading trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    /// Byte offset of the token text in the original source. Used as the
    /// stable identity for rename and drop decisions computed on the CST.
    pub offset: u32,
    pub leading: Vec<Trivia>,
}

/// The whole stream; the final element is always an EOF token with empty
/// text carrying the file's trailing trivia.
#[derive(Debug, Clone)]
pub struct TokenStream {
    pub tokens: Vec<MinToken>,
}

impl TokenStream {
    /// Attach trivia to the following significant token.
    pub fn from_lexed(lexed: &[CsToken]) -> Self {
        let mut tokens = Vec::new();
        let mut pending: Vec<Trivia> = Vec::new();

        for token in lexed {
            if token.kind.is_trivia() {
                pending.push(Trivia::new(token.kind, token.text.clone()));
            } else {
                tokens.push(MinToken {
                    kind: token.kind,
                    text: token.text.clone(),
                    offset: token.span.start as u32,
                    leading: std::mem::take(&mut pending),
                });
            }
        }

        // The lexer always terminates the stream with an EOF token, so the
        // loop above has already flushed `pending` into it.
        debug_assert!(pending.is_empty());
        debug_assert!(matches!(
            tokens.last(),
            Some(MinToken {
                kind: CsSyntaxKind::Eof,
                ..
            })
        ));

        Self { tokens }
    }

    /// Concatenate the stream back into text.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            for trivia in &token.leading {
                out.push_str(&trivia.text);
            }
            out.push_str(&token.text);
        }
        out
    }

    /// Significant tokens only (excluding EOF).
    pub fn significant(&self) -> impl Iterator<Item = &MinToken> {
        self.tokens
            .iter()
            .filter(|t| t.kind != CsSyntaxKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::lex_with_trivia;

    #[test]
    fn test_roundtrip() {
        let source = "class C {\n\t// comment\n\tint x = 1; /* b */\n}\n";
        let (lexed, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let stream = TokenStream::from_lexed(&lexed);
        assert_eq!(stream.text(), source);
    }

    #[test]
    fn test_trailing_trivia_lands_on_eof() {
        let source = "int x; // tail\n";
        let (lexed, _) = lex_with_trivia(source);
        let stream = TokenStream::from_lexed(&lexed);
        let eof = stream.tokens.last().unwrap();
        assert_eq!(eof.kind, CsSyntaxKind::Eof);
        assert!(eof.leading.iter().any(|t| t.kind == CsSyntaxKind::CommentLine));
    }

    #[test]
    fn test_offsets_point_into_source() {
        let source = "int abc = 42;";
        let (lexed, _) = lex_with_trivia(source);
        let stream = TokenStream::from_lexed(&lexed);
        for token in stream.significant() {
            let start = token.offset as usize;
            assert_eq!(&source[start..start + token.text.len()], token.text);
        }
    }
}
