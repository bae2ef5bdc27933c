//! Whitespace compactor
//!
//! Rebuilds each token's leading trivia minimally. Comments and directives
//! that earlier passes kept stay, with the line structure they require; all
//! other whitespace goes, except the single space needed where two adjacent
//! tokens would otherwise merge into one.
//!
//! Separation is only ever inserted where the original text had trivia:
//! tokens the lexer produced back-to-back (`>>` as two `>`s, `x++`) are
//! already lexically sound and must stay glued.

use crate::syntax::{CsSyntaxKind, TokenStream, Trivia};

pub fn compact_whitespace(stream: &mut TokenStream) {
    let mut prev_char: Option<char> = None;

    for token in &mut stream.tokens {
        let old = std::mem::take(&mut token.leading);
        // Tokens the lexer produced back-to-back must stay glued; a
        // separator is only ever considered where trivia existed.
        let had_trivia = !old.is_empty();
        let mut new: Vec<Trivia> = Vec::new();

        for trivia in old {
            match trivia.kind {
                CsSyntaxKind::Whitespace | CsSyntaxKind::Newline => {}
                CsSyntaxKind::CommentLine => {
                    if let (Some(prev), Some(first)) = (prev_char, trivia.text.chars().next()) {
                        if needs_separator(prev, first) {
                            new.push(Trivia::space());
                        }
                    }
                    prev_char = trivia.text.chars().last().or(prev_char);
                    new.push(trivia);
                    // A line comment owns the rest of its line.
                    new.push(Trivia::newline());
                    prev_char = Some('\n');
                }
                CsSyntaxKind::CommentBlock => {
                    if let (Some(prev), Some(first)) = (prev_char, trivia.text.chars().next()) {
                        if needs_separator(prev, first) {
                            new.push(Trivia::space());
                        }
                    }
                    prev_char = trivia.text.chars().last().or(prev_char);
                    new.push(trivia);
                }
                CsSyntaxKind::RegionStart
                | CsSyntaxKind::RegionEnd
                | CsSyntaxKind::Directive => {
                    // Directives must stand alone on their line.
                    if prev_char.is_some() && prev_char != Some('\n') {
                        new.push(Trivia::newline());
                    }
                    new.push(trivia);
                    new.push(Trivia::newline());
                    prev_char = Some('\n');
                }
                _ => new.push(trivia),
            }
        }

        if let Some(first) = token.text.chars().next() {
            if let Some(prev) = prev_char {
                if had_trivia && new.is_empty() && needs_separator(prev, first) {
                    new.push(Trivia::space());
                }
            }
            prev_char = token.text.chars().last();
        }

        token.leading = new;
    }
}

/// Would `prev` and `next`, emitted adjacently, lex as something else?
pub(crate) fn needs_separator(prev: char, next: char) -> bool {
    fn is_word(c: char) -> bool {
        c == '_' || c == '@' || c == '$' || c.is_alphanumeric()
    }

    if is_word(prev) && is_word(next) {
        return true;
    }

    // Pairs that would fuse into a longer operator or a comment opener.
    matches!(
        (prev, next),
        ('+', '+')
            | ('+', '=')
            | ('-', '-')
            | ('-', '=')
            | ('-', '>')
            | ('&', '&')
            | ('&', '=')
            | ('|', '|')
            | ('|', '=')
            | ('^', '=')
            | ('=', '=')
            | ('=', '>')
            | ('<', '<')
            | ('<', '=')
            | ('>', '=')
            | ('>', '>')
            | ('!', '=')
            | ('*', '=')
            | ('*', '/')
            | ('/', '=')
            | ('/', '/')
            | ('/', '*')
            | ('%', '=')
            | ('?', '?')
            | ('?', '.')
            | ('?', '[')
            | (':', ':')
            | ('.', '.')
    ) || (prev.is_ascii_digit() && next == '.')
        || (prev == '.' && next.is_ascii_digit())
}
