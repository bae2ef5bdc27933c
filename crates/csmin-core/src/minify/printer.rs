//! Serializer
//!
//! Emits the surviving trivia and tokens as text. With a positive line
//! limit, a line break replaces the separation before any token that would
//! overflow — breaks only ever land between tokens, never inside one. A
//! token longer than the limit is emitted unbroken; the limit shapes
//! layout, it does not truncate.

use crate::syntax::{CsSyntaxKind, TokenStream};

/// Print the stream, wrapping at `line_length` columns when it is positive.
pub fn print(stream: &TokenStream, line_length: usize) -> String {
    let mut printer = Printer::new(line_length);
    for token in &stream.tokens {
        for trivia in &token.leading {
            printer.push(&trivia.text);
        }
        if token.kind == CsSyntaxKind::Eof {
            continue;
        }
        printer.push_token(&token.text);
    }
    printer.finish()
}

struct Printer {
    line_length: usize,
    out: String,
    column: usize,
}

impl Printer {
    fn new(line_length: usize) -> Self {
        Self {
            line_length,
            out: String::with_capacity(4096),
            column: 0,
        }
    }

    /// Emit text as-is, tracking the column.
    fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.out.push_str(text);
        match text.rfind('\n') {
            Some(pos) => self.column = text[pos + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
    }

    /// Emit a significant token, breaking the line first when it would
    /// overflow the limit.
    fn push_token(&mut self, text: &str) {
        if self.line_length > 0 && self.column > 0 && !text.contains('\n') {
            let width = text.chars().count();
            if self.column + width > self.line_length {
                // Replace the separation we just emitted with a break.
                while self.out.ends_with(' ') || self.out.ends_with('\t') {
                    self.out.pop();
                }
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.column = 0;
            }
        }
        self.push(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{TokenStream, lex_with_trivia};

    fn stream_of(source: &str) -> TokenStream {
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        TokenStream::from_lexed(&tokens)
    }

    fn max_line_len(text: &str) -> usize {
        text.lines().map(|l| l.chars().count()).max().unwrap_or(0)
    }

    #[test]
    fn test_zero_limit_prints_verbatim() {
        let source = "class C { int x = 1; }\n";
        assert_eq!(print(&stream_of(source), 0), source);
    }

    #[test]
    fn test_wrapping_respects_limit() {
        let source = "int aaaa = 1; int bbbb = 2; int cccc = 3; int dddd = 4;";
        let out = print(&stream_of(source), 20);
        assert!(max_line_len(&out) <= 20, "line too long in:\n{out}");
    }

    #[test]
    fn test_wrapping_never_splits_tokens() {
        let source = "var name = somewhatLongIdentifierName + anotherLongIdentifierName;";
        let out = print(&stream_of(source), 24);
        assert!(out.contains("somewhatLongIdentifierName"));
        assert!(out.contains("anotherLongIdentifierName"));
    }

    #[test]
    fn test_oversized_token_emitted_unbroken() {
        let long = "thisIdentifierIsLongerThanTheLimitItself";
        let source = format!("var x = {long};");
        let out = print(&stream_of(&source), 16);
        assert!(out.contains(long));
    }

    #[test]
    fn test_wrapping_is_idempotent() {
        let source = "int aaaa = 1; int bbbb = 2; int cccc = 3; int dddd = 4;";
        let once = print(&stream_of(source), 20);
        let twice = print(&stream_of(&once), 20);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_multiline_token_resets_column() {
        let source = "var s = @\"first\nsecond\"; int x = 1;";
        let out = print(&stream_of(source), 30);
        assert!(out.contains("@\"first\nsecond\""));
    }
}
