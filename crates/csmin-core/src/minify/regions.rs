//! Region stripper
//!
//! Removes `#region`/`#endregion` trivia, nested pairs included, together
//! with the line each directive occupied. A directive whose text matches
//! the comment ignore set survives. Code tokens and other directives are
//! never touched.

use tracing::trace;

use crate::ignore::IgnoreFilter;
use crate::syntax::{CsSyntaxKind, TokenStream, Trivia};

use super::whitespace::needs_separator;

pub fn strip_regions(stream: &mut TokenStream, ignore: &IgnoreFilter) {
    let mut prev_last_char: Option<char> = None;

    for token in &mut stream.tokens {
        let old = std::mem::take(&mut token.leading);
        let had_trivia = !old.is_empty();
        let mut new: Vec<Trivia> = Vec::with_capacity(old.len());

        let mut iter = old.into_iter().peekable();
        while let Some(trivia) = iter.next() {
            if trivia.kind.is_region_directive() && !ignore.keeps_comment(&trivia.text) {
                trace!(directive = %trivia.text, "stripping region directive");
                // The directive's line dies with it: drop the indentation
                // just emitted and the terminator that follows.
                if new
                    .last()
                    .is_some_and(|t| t.kind == CsSyntaxKind::Whitespace)
                {
                    let line_leading = new.len() < 2
                        || new[new.len() - 2].kind == CsSyntaxKind::Newline;
                    if line_leading {
                        new.pop();
                    }
                }
                if iter
                    .peek()
                    .is_some_and(|t| t.kind == CsSyntaxKind::Newline)
                {
                    iter.next();
                }
                continue;
            }
            new.push(trivia);
        }

        // Never let a removal glue two tokens together.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lex_with_trivia;

    fn run(source: &str, ignore: &IgnoreFilter) -> String {
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let mut stream = TokenStream::from_lexed(&tokens);
        strip_regions(&mut stream, ignore);
        stream.text()
    }

    #[test]
    fn test_removes_region_pair_and_lines() {
        let source = "class C\n{\n    #region Fields\n    int x;\n    #endregion\n}\n";
        let out = run(source, &IgnoreFilter::default());
        assert!(!out.contains("#region"));
        assert!(!out.contains("#endregion"));
        assert!(out.contains("int x;"));
    }

    #[test]
    fn test_nested_regions_all_removed() {
        let source = "#region outer\n#region inner\nint x;\n#endregion\n#endregion\n";
        let out = run(source, &IgnoreFilter::default());
        assert!(!out.contains("#region"));
        assert!(!out.contains("#endregion"));
    }

    #[test]
    fn test_ignored_region_survives() {
        let ignore = IgnoreFilter::new(Vec::<String>::new(), ["keep this"]);
        let source = "#region keep this\nint x;\n#endregion\n";
        let out = run(source, &ignore);
        assert!(out.contains("#region keep this"));
        assert!(!out.contains("#endregion"));
    }

    #[test]
    fn test_other_directives_untouched() {
        let source = "#pragma warning disable\nint x;\n";
        let out = run(source, &IgnoreFilter::default());
        assert_eq!(out, source);
    }
}
