//! Cross-cutting syntax tests: every fixture must round-trip losslessly
//! through both the CST and the token stream view.

use super::*;

const FIXTURES: &[&str] = &[
    "",
    "class C { }",
    "using System;\n\nnamespace App\n{\n    class Program\n    {\n        static void Main(string[] args)\n        {\n            int count = 0;\n            count += 1;\n        }\n    }\n}\n",
    "class C\n{\n    #region State\n    int _x; // counter\n    #endregion\n\n    /* doc */\n    public int Get() => _x;\n}\n",
    "class S { string V = @\"multi\nline \"\"quoted\"\"\"; }",
    "class I { string F(int x) => $\"value = {x + 1}\"; }",
    "enum Color : byte { Red, Green = 2, Blue }\n",
    "interface IShape\n{\n    double Area();\n    double Perimeter { get; }\n}\n",
];

#[test]
fn test_cst_round_trip_is_lossless() {
    for &source in FIXTURES {
        let (cst, lex_errors, parse_errors) = parse(source);
        assert!(lex_errors.is_empty(), "lex errors for {source:?}: {lex_errors:?}");
        assert!(
            parse_errors.is_empty(),
            "parse errors for {source:?}: {parse_errors:?}"
        );
        assert_eq!(cst.text().to_string(), source, "lossless CST for {source:?}");
    }
}

#[test]
fn test_stream_round_trip_is_lossless() {
    for &source in FIXTURES {
        let (tokens, errors) = lex_with_trivia(source);
        assert!(errors.is_empty());
        let stream = TokenStream::from_lexed(&tokens);
        assert_eq!(stream.text(), source, "lossless stream for {source:?}");
    }
}

#[test]
fn test_every_identifier_is_classified() {
    // Each Ident token in declaration-bearing positions must be wrapped in
    // Name or NameRef; only contextual grammar words stay bare.
    let source = "class C { int P { get; set; } void M(int a) { var b = a; } }";
    let (cst, _, parse_errors) = parse(source);
    assert!(parse_errors.is_empty());

    let mut bare = Vec::new();
    for element in cst.descendants_with_tokens() {
        if let Some(token) = element.as_token() {
            if token.kind() == CsSyntaxKind::Ident {
                let parent_kind = token.parent().map(|p| p.kind());
                if !matches!(
                    parent_kind,
                    Some(CsSyntaxKind::Name) | Some(CsSyntaxKind::NameRef)
                ) {
                    bare.push(token.text().to_string());
                }
            }
        }
    }
    // get/set accessor names are the only bare identifiers here
    assert_eq!(bare, vec!["get".to_string(), "set".to_string()]);
}
