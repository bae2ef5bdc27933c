//! Trivia-preserving lexer for C# source text
//!
//! The lexer keeps ALL source information: whitespace, newlines, comments and
//! preprocessor directives become tokens of trivia kinds instead of being
//! skipped. This enables lossless round-tripping: concatenating the text of
//! every token reproduces the input exactly, which the minification passes
//! rely on when they start deleting pieces.
//!
//! String, character and comment contents are never tokenized as code.
//! Unterminated literals or comments and characters the language has no use
//! for produce a [`LexError`]; the engine aborts the whole invocation on any
//! of them rather than emitting partial output.

use super::CsSyntaxKind;
use std::ops::Range;

/// Byte range in the source text.
pub type CsSpan = Range<usize>;

/// A lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: CsSpan,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: CsSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind, exact text, and span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CsSpan,
}

impl CsToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CsSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the lexer.
pub type LexResult = (Vec<CsToken>, Vec<LexError>);

/// Lex input preserving all trivia.
pub fn lex_with_trivia(input: &str) -> LexResult {
    let mut tokens: Vec<CsToken> = Vec::new();
    let mut errors = Vec::new();

    let len = input.len();
    let mut i = 0usize;
    // Directives are only recognized when nothing but whitespace precedes
    // them on their line.
    let mut at_line_start = true;

    while i < len {
        let (current, size) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        let start = i;

        let kind = match current {
            '\n' => {
                tokens.push(CsToken::new(CsSyntaxKind::Newline, "\n", start..i + size));
                i += size;
                at_line_start = true;
                continue;
            }
            '\r' => {
                let mut end = i + size;
                if let Some(('\n', nl)) = next_char(input, end) {
                    end += nl;
                }
                tokens.push(CsToken::new(
                    CsSyntaxKind::Newline,
                    &input[start..end],
                    start..end,
                ));
                i = end;
                at_line_start = true;
                continue;
            }

            c if c.is_whitespace() => {
                let mut end = i + size;
                while let Some((ch, step)) = next_char(input, end) {
                    if ch.is_whitespace() && ch != '\n' && ch != '\r' {
                        end += step;
                    } else {
                        break;
                    }
                }
                tokens.push(CsToken::new(
                    CsSyntaxKind::Whitespace,
                    &input[start..end],
                    start..end,
                ));
                i = end;
                continue;
            }

            '/' => match next_char(input, i + size) {
                Some(('/', _)) => {
                    let end = line_end(input, start);
                    tokens.push(CsToken::new(
                        CsSyntaxKind::CommentLine,
                        &input[start..end],
                        start..end,
                    ));
                    i = end;
                    at_line_start = false;
                    continue;
                }
                Some(('*', star)) => {
                    let (end, terminated) = block_comment_end(input, i + size + star);
                    if !terminated {
                        errors.push(LexError::new("unterminated block comment", start..end));
                    }
                    tokens.push(CsToken::new(
                        CsSyntaxKind::CommentBlock,
                        &input[start..end],
                        start..end,
                    ));
                    i = end;
                    at_line_start = false;
                    continue;
                }
                Some(('=', eq)) => {
                    tokens.push(CsToken::new(
                        CsSyntaxKind::SlashEq,
                        "/=",
                        start..i + size + eq,
                    ));
                    i += size + eq;
                    at_line_start = false;
                    continue;
                }
                _ => CsSyntaxKind::Slash,
            },

            '#' => {
                if !at_line_start {
                    errors.push(LexError::new(
                        "preprocessor directive not at start of line",
                        start..i + size,
                    ));
                }
                let end = line_end(input, start);
                let kind = classify_directive(&input[start..end]);
                tokens.push(CsToken::new(kind, &input[start..end], start..end));
                i = end;
                at_line_start = false;
                continue;
            }

            '@' => {
                match next_char(input, i + size) {
                    Some(('"', _)) => {
                        let (end, err) = lex_verbatim_string(input, start, i + size);
                        if let Some(e) = err {
                            errors.push(e);
                        }
                        tokens.push(CsToken::new(
                            CsSyntaxKind::VerbatimString,
                            &input[start..end],
                            start..end,
                        ));
                        i = end;
                        at_line_start = false;
                        continue;
                    }
                    Some(('$', dollar)) => {
                        let (end, err) = lex_interpolated_string(input, start, i + size + dollar);
                        if let Some(e) = err {
                            errors.push(e);
                        }
                        tokens.push(CsToken::new(
                            CsSyntaxKind::InterpolatedString,
                            &input[start..end],
                            start..end,
                        ));
                        i = end;
                        at_line_start = false;
                        continue;
                    }
                    Some((c, _)) if is_ident_start(c) => {
                        // Verbatim identifier: @name is always an identifier,
                        // never a keyword.
                        let end = ident_end(input, i + size);
                        tokens.push(CsToken::new(
                            CsSyntaxKind::Ident,
                            &input[start..end],
                            start..end,
                        ));
                        i = end;
                        at_line_start = false;
                        continue;
                    }
                    _ => {
                        errors.push(LexError::new("stray '@'", start..i + size));
                        tokens.push(CsToken::new(CsSyntaxKind::Error, "@", start..i + size));
                        i += size;
                        at_line_start = false;
                        continue;
                    }
                }
            }

            '$' => {
                // $" or $@" starts an interpolated string
                let mut j = i + size;
                if let Some(('@', at)) = next_char(input, j) {
                    j += at;
                }
                if let Some(('"', _)) = next_char(input, j) {
                    let (end, err) = lex_interpolated_string(input, start, j);
                    if let Some(e) = err {
                        errors.push(e);
                    }
                    tokens.push(CsToken::new(
                        CsSyntaxKind::InterpolatedString,
                        &input[start..end],
                        start..end,
                    ));
                    i = end;
                    at_line_start = false;
                    continue;
                }
                errors.push(LexError::new("stray '$'", start..i + size));
                tokens.push(CsToken::new(CsSyntaxKind::Error, "$", start..i + size));
                i += size;
                at_line_start = false;
                continue;
            }

            '"' => {
                let (end, err) = lex_string(input, start);
                if let Some(e) = err {
                    errors.push(e);
                }
                tokens.push(CsToken::new(
                    CsSyntaxKind::StringLiteral,
                    &input[start..end],
                    start..end,
                ));
                i = end;
                at_line_start = false;
                continue;
            }

            '\'' => {
                let (end, err) = lex_char_literal(input, start);
                if let Some(e) = err {
                    errors.push(e);
                }
                tokens.push(CsToken::new(
                    CsSyntaxKind::CharLiteral,
                    &input[start..end],
                    start..end,
                ));
                i = end;
                at_line_start = false;
                continue;
            }

            c if c.is_ascii_digit() => {
                let (kind, end) = lex_number(input, start);
                tokens.push(CsToken::new(kind, &input[start..end], start..end));
                i = end;
                at_line_start = false;
                continue;
            }

            '.' => {
                // A dot directly followed by a digit starts a real literal
                if let Some((c, _)) = next_char(input, i + size) {
                    if c.is_ascii_digit() {
                        let (_, end) = lex_number(input, start);
                        tokens.push(CsToken::new(
                            CsSyntaxKind::RealLiteral,
                            &input[start..end],
                            start..end,
                        ));
                        i = end;
                        at_line_start = false;
                        continue;
                    }
                }
                CsSyntaxKind::Dot
            }

            c if is_ident_start(c) => {
                let end = ident_end(input, start);
                let text = &input[start..end];
                let kind = CsSyntaxKind::from_keyword(text).unwrap_or(CsSyntaxKind::Ident);
                tokens.push(CsToken::new(kind, text, start..end));
                i = end;
                at_line_start = false;
                continue;
            }

            _ => match punctuation(input, start) {
                Some((kind, end)) => {
                    tokens.push(CsToken::new(kind, &input[start..end], start..end));
                    i = end;
                    at_line_start = false;
                    continue;
                }
                None => {
                    errors.push(LexError::new(
                        format!("unexpected character: '{current}'"),
                        start..i + size,
                    ));
                    tokens.push(CsToken::new(
                        CsSyntaxKind::Error,
                        &input[start..i + size],
                        start..i + size,
                    ));
                    i += size;
                    at_line_start = false;
                    continue;
                }
            },
        };

        // Single-character fallthrough (Slash, Dot)
        tokens.push(CsToken::new(kind, &input[start..i + size], start..i + size));
        i += size;
        at_line_start = false;
    }

    tokens.push(CsToken::new(CsSyntaxKind::Eof, "", len..len));

    (tokens, errors)
}

/// End of the current line, excluding the terminator.
fn line_end(input: &str, start: usize) -> usize {
    match input[start..].find(['\n', '\r']) {
        Some(rel) => start + rel,
        None => input.len(),
    }
}

/// Scan past a block comment body; returns (end, terminated).
fn block_comment_end(input: &str, mut i: usize) -> (usize, bool) {
    let len = input.len();
    while i < len {
        let (c, step) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        if c == '*' {
            if let Some(('/', slash)) = next_char(input, i + step) {
                return (i + step + slash, true);
            }
        }
        i += step;
    }
    (len, false)
}

fn classify_directive(text: &str) -> CsSyntaxKind {
    let body = text[1..].trim_start();
    let word: String = body.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    match word.as_str() {
        "region" => CsSyntaxKind::RegionStart,
        "endregion" => CsSyntaxKind::RegionEnd,
        _ => CsSyntaxKind::Directive,
    }
}

/// Lex a regular string literal `"..."`; escapes with `\`, no line breaks.
fn lex_string(input: &str, start: usize) -> (usize, Option<LexError>) {
    let len = input.len();
    let mut i = start + 1;
    while i < len {
        let (c, step) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        match c {
            '"' => return (i + step, None),
            '\\' => {
                i += step;
                if let Some((_, esc)) = next_char(input, i) {
                    i += esc;
                }
            }
            '\n' | '\r' => {
                return (
                    i,
                    Some(LexError::new("unterminated string literal", start..i)),
                );
            }
            _ => i += step,
        }
    }
    (
        len,
        Some(LexError::new("unterminated string literal", start..len)),
    )
}

/// Lex a verbatim string `@"..."`; `""` is the only escape, may span lines.
fn lex_verbatim_string(input: &str, start: usize, quote: usize) -> (usize, Option<LexError>) {
    let len = input.len();
    let mut i = quote + 1;
    while i < len {
        let (c, step) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        if c == '"' {
            if let Some(('"', second)) = next_char(input, i + step) {
                i += step + second;
                continue;
            }
            return (i + step, None);
        }
        i += step;
    }
    (
        len,
        Some(LexError::new("unterminated verbatim string", start..len)),
    )
}

/// Lex an interpolated string starting at its opening quote.
///
/// The contents are kept as one opaque token; holes are tracked only far
/// enough to find the closing quote (`{{`/`}}` escapes, nested strings
/// inside holes). The resolver later scans hole text for identifier words.
fn lex_interpolated_string(input: &str, start: usize, quote: usize) -> (usize, Option<LexError>) {
    let verbatim = input[start..quote].contains('@');
    let len = input.len();
    let mut i = quote + 1;
    let mut depth = 0usize;

    while i < len {
        let (c, step) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        match c {
            '{' if depth == 0 => {
                if let Some(('{', second)) = next_char(input, i + step) {
                    i += step + second;
                } else {
                    depth = 1;
                    i += step;
                }
            }
            '}' if depth == 0 => {
                if let Some(('}', second)) = next_char(input, i + step) {
                    i += step + second;
                } else {
                    // Lone '}' in the literal part; the compiler rejects it,
                    // but the token boundary is still unambiguous.
                    i += step;
                }
            }
            '{' => {
                depth += 1;
                i += step;
            }
            '}' => {
                depth -= 1;
                i += step;
            }
            '"' if depth > 0 => {
                // Nested string inside a hole
                let (end, err) = lex_string(input, i);
                if err.is_some() {
                    return (
                        end,
                        Some(LexError::new("unterminated interpolated string", start..end)),
                    );
                }
                i = end;
            }
            '"' => {
                if verbatim {
                    if let Some(('"', second)) = next_char(input, i + step) {
                        i += step + second;
                        continue;
                    }
                }
                return (i + step, None);
            }
            '\\' if !verbatim && depth == 0 => {
                i += step;
                if let Some((_, esc)) = next_char(input, i) {
                    i += esc;
                }
            }
            '\n' | '\r' if !verbatim => {
                return (
                    i,
                    Some(LexError::new("unterminated interpolated string", start..i)),
                );
            }
            _ => i += step,
        }
    }
    (
        len,
        Some(LexError::new("unterminated interpolated string", start..len)),
    )
}

/// Lex a character literal `'x'` or `'\n'`.
fn lex_char_literal(input: &str, start: usize) -> (usize, Option<LexError>) {
    let len = input.len();
    let mut i = start + 1;
    while i < len {
        let (c, step) = match next_char(input, i) {
            Some(pair) => pair,
            None => break,
        };
        match c {
            '\'' => return (i + step, None),
            '\\' => {
                i += step;
                if let Some((_, esc)) = next_char(input, i) {
                    i += esc;
                }
            }
            '\n' | '\r' => {
                return (
                    i,
                    Some(LexError::new("unterminated character literal", start..i)),
                );
            }
            _ => i += step,
        }
    }
    (
        len,
        Some(LexError::new("unterminated character literal", start..len)),
    )
}

/// Lex a numeric literal, preserving its exact text (casing, suffixes).
fn lex_number(input: &str, start: usize) -> (CsSyntaxKind, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = start;
    let mut real = false;

    if bytes[i] == b'0' && i + 1 < len && (bytes[i + 1] == b'x' || bytes[i + 1] == b'X') {
        i += 2;
        while i < len && (bytes[i] as char).is_ascii_hexdigit() {
            i += 1;
        }
        while i < len && matches!(bytes[i], b'u' | b'U' | b'l' | b'L') {
            i += 1;
        }
        return (CsSyntaxKind::IntLiteral, i);
    }

    if bytes[i] == b'.' {
        real = true;
        i += 1;
    }
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if !real && i + 1 < len && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        real = true;
        i += 1;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < len && bytes[j].is_ascii_digit() {
            real = true;
            i = j;
            while i < len && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    if i < len && matches!(bytes[i], b'f' | b'F' | b'd' | b'D' | b'm' | b'M') {
        real = true;
        i += 1;
    } else {
        while i < len && matches!(bytes[i], b'u' | b'U' | b'l' | b'L') {
            i += 1;
        }
    }

    let kind = if real {
        CsSyntaxKind::RealLiteral
    } else {
        CsSyntaxKind::IntLiteral
    };
    (kind, i)
}

/// Longest-match punctuation and operator lexing.
///
/// `>>` is deliberately left as two `>` tokens so generic argument lists
/// close without special casing; adjacent tokens are never separated later,
/// so shift expressions survive untouched.
fn punctuation(input: &str, start: usize) -> Option<(CsSyntaxKind, usize)> {
    use CsSyntaxKind::*;
    let bytes = input.as_bytes();
    let len = bytes.len();
    let rest = len - start;

    let three = if rest >= 3 { &input[start..start + 3] } else { "" };
    match three {
        "<<=" => return Some((ShlEq, start + 3)),
        "??=" => return Some((QuestionQuestionEq, start + 3)),
        _ => {}
    }

    let two = if rest >= 2 { &input[start..start + 2] } else { "" };
    let kind = match two {
        "::" => Some(ColonColon),
        "??" => Some(QuestionQuestion),
        "?." => Some(QuestionDot),
        "<=" => Some(LtEq),
        ">=" => Some(GtEq),
        "==" => Some(EqEq),
        "!=" => Some(BangEq),
        "=>" => Some(FatArrow),
        "++" => Some(PlusPlus),
        "+=" => Some(PlusEq),
        "--" => Some(MinusMinus),
        "-=" => Some(MinusEq),
        "->" => Some(Arrow),
        "*=" => Some(StarEq),
        "%=" => Some(PercentEq),
        "&&" => Some(AmpAmp),
        "&=" => Some(AmpEq),
        "||" => Some(PipePipe),
        "|=" => Some(PipeEq),
        "^=" => Some(CaretEq),
        "<<" => Some(Shl),
        _ => None,
    };
    if let Some(kind) = kind {
        return Some((kind, start + 2));
    }

    let kind = match bytes[start] as char {
        '{' => LBrace,
        '}' => RBrace,
        '(' => LParen,
        ')' => RParen,
        '[' => LBracket,
        ']' => RBracket,
        ';' => Semicolon,
        ',' => Comma,
        ':' => Colon,
        '?' => Question,
        '<' => Lt,
        '>' => Gt,
        '=' => Eq,
        '+' => Plus,
        '-' => Minus,
        '*' => Star,
        '%' => Percent,
        '&' => Amp,
        '|' => Pipe,
        '^' => Caret,
        '!' => Bang,
        '~' => Tilde,
        _ => return None,
    };
    Some((kind, start + 1))
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn ident_end(input: &str, start: usize) -> usize {
    let mut end = start;
    for (offset, ch) in input[start..].char_indices() {
        if is_ident_continue(ch) {
            end = start + offset + ch.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Get next character and its UTF-8 size.
fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(tokens: &[CsToken]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_lossless_reconstruction() {
        let input = "class C {\n\tint x = 42; // answer\n\t/* block */\n}\n";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        assert_eq!(reconstruct(&tokens), input);
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        let (tokens, errors) = lex_with_trivia("class Class");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, CsSyntaxKind::ClassKw);
        assert_eq!(tokens[2].kind, CsSyntaxKind::Ident);
        assert_eq!(tokens[2].text, "Class");
    }

    #[test]
    fn test_verbatim_identifier() {
        let (tokens, errors) = lex_with_trivia("@class");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, CsSyntaxKind::Ident);
        assert_eq!(tokens[0].text, "@class");
    }

    #[test]
    fn test_numeric_literals_keep_exact_text() {
        let (tokens, errors) = lex_with_trivia("255 0x7048860F9180 1.5f 2UL 1e10");
        assert!(errors.is_empty());
        let nums: Vec<_> = tokens
            .iter()
            .filter(|t| {
                matches!(
                    t.kind,
                    CsSyntaxKind::IntLiteral | CsSyntaxKind::RealLiteral
                )
            })
            .collect();
        assert_eq!(nums.len(), 5);
        assert_eq!(nums[0].text, "255");
        assert_eq!(nums[1].text, "0x7048860F9180");
        assert_eq!(nums[1].kind, CsSyntaxKind::IntLiteral);
        assert_eq!(nums[2].text, "1.5f");
        assert_eq!(nums[3].text, "2UL");
        assert_eq!(nums[4].text, "1e10");
    }

    #[test]
    fn test_string_contents_not_tokenized() {
        let input = r#"string s = "class { } // not a comment";"#;
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        let strings: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == CsSyntaxKind::StringLiteral)
            .collect();
        assert_eq!(strings.len(), 1);
        assert!(strings[0].text.contains("// not a comment"));
    }

    #[test]
    fn test_verbatim_string_spans_lines() {
        let input = "var s = @\"line one\nline \"\"two\"\"\";";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        let v = tokens
            .iter()
            .find(|t| t.kind == CsSyntaxKind::VerbatimString)
            .expect("verbatim string token");
        assert!(v.text.contains('\n'));
        assert!(v.text.ends_with("\"\"\""));
    }

    #[test]
    fn test_interpolated_string_single_token() {
        let input = r#"var s = $"x = {x + 1}, y = {y}";"#;
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        let s = tokens
            .iter()
            .find(|t| t.kind == CsSyntaxKind::InterpolatedString)
            .expect("interpolated string token");
        assert!(s.text.contains("{x + 1}"));
    }

    #[test]
    fn test_region_directives() {
        let input = "#region Private helpers\nint x;\n#endregion\n";
        let (tokens, errors) = lex_with_trivia(input);
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, CsSyntaxKind::RegionStart);
        assert_eq!(tokens[0].text, "#region Private helpers");
        assert!(tokens.iter().any(|t| t.kind == CsSyntaxKind::RegionEnd));
    }

    #[test]
    fn test_other_directive() {
        let (tokens, errors) = lex_with_trivia("#pragma warning disable 1591\n");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, CsSyntaxKind::Directive);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let (_, errors) = lex_with_trivia("var s = \"oops\nint x;");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_block_comment_is_error() {
        let (_, errors) = lex_with_trivia("int x; /* never closed");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("block comment"));
    }

    #[test]
    fn test_operators_longest_match() {
        let (tokens, errors) = lex_with_trivia("a<<=b??=c?.d");
        assert!(errors.is_empty());
        let kinds: Vec<_> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != CsSyntaxKind::Eof)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                CsSyntaxKind::Ident,
                CsSyntaxKind::ShlEq,
                CsSyntaxKind::Ident,
                CsSyntaxKind::QuestionQuestionEq,
                CsSyntaxKind::Ident,
                CsSyntaxKind::QuestionDot,
                CsSyntaxKind::Ident,
            ]
        );
    }

    #[test]
    fn test_shift_right_stays_two_tokens() {
        let (tokens, errors) = lex_with_trivia("x >> 2");
        assert!(errors.is_empty());
        let gts = tokens
            .iter()
            .filter(|t| t.kind == CsSyntaxKind::Gt)
            .count();
        assert_eq!(gts, 2);
    }
}
