//! Lossless C# syntax layer
//!
//! This module implements a lossless concrete syntax tree using the Rowan
//! library. The CST preserves all source information — whitespace, comments
//! and preprocessor directives included — so that:
//! - `parse(source).text() == source` before any transformation
//! - the minification passes can delete exactly the pieces they mean to
//! - the symbol resolver sees declaration structure without a type checker
//!
//! Trivia is modeled as tokens in the stream; the [`stream::TokenStream`]
//! view re-attaches each run of trivia to the significant token that
//! follows it for the passes that rewrite the file.

mod builder;
mod language;
mod syntax_kind;

pub mod lexer;
pub mod parser;
pub mod stream;

pub use builder::CstBuilder;
pub use language::{CsLanguage, CsSyntaxElement, CsSyntaxNode, CsSyntaxToken};
pub use lexer::{CsSpan, CsToken, LexError, LexResult, lex_with_trivia};
pub use parser::{ParseError, parse};
pub use stream::{MinToken, TokenStream, Trivia};
pub use syntax_kind::CsSyntaxKind;

#[cfg(test)]
mod tests;
