//! Comment stripper
//!
//! Drops line and block comments, doc comments included, unless the ignore
//! set matches the comment's full text. Removing a comment never merges the
//! tokens around it: when a block comment was the only separation between
//! two tokens that would otherwise lex differently, a single space is left
//! in its place. Line terminators stay where they are; they are separate
//! trivia.

use tracing::trace;

use crate::ignore::IgnoreFilter;
use crate::syntax::{TokenStream, Trivia};

use super::whitespace::needs_separator;

pub fn strip_comments(stream: &mut TokenStream, ignore: &IgnoreFilter) {
    let mut prev_last_char: Option<char> = None;

    for token in &mut stream.tokens {
        let old = std::mem::take(&mut token.leading);
        let had_trivia = !old.is_empty();
        let mut new: Vec<Trivia> = Vec::with_capacity(old.len());

        for trivia in old {
            if trivia.kind.is_comment() && !ignore.keeps_comment(&trivia.text) {
                trace!(comment = %trivia.text, "stripping comment");
                continue;
            }
            new.push(trivia);
        }

        if had_trivia && new.is_empty() {
            if let (Some(prev), Some(next)) = (prev_last_char, token.text.chars().next()) {
                if needs_separator(prev, next) {
                    new.push(Trivia::space());
                }
            }
        }

        token.leading = new;
        if let Some(last) = token.text.chars().last() {
            prev_last_char = Some(last);
        } else if let Some(last_trivia) = token.leading.last() {
            prev_last_char = last_trivia.text.chars().last();
        }
    }
}
