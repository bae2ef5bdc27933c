//! Miscellaneous syntactic simplifications
//!
//! Purely structural shrinking that needs no symbol machinery:
//! - an explicit access modifier equal to the context's implicit default
//!   (`private` on class/struct members and nested types, `internal` on
//!   top-level types) is dropped,
//! - braces of a single-statement embedded body are unwrapped when the
//!   statement is legal without them,
//! - a bare block directly inside another block is flattened when it
//!   declares nothing.
//!
//! Literal tokens are never rewritten: `255` stays `255`, hexadecimal stays
//! hexadecimal in its original casing.
//!
//! The analysis runs over the CST and yields token offsets to drop; the
//! stream edit happens in [`apply_drops`].

use std::collections::HashSet;

use tracing::trace;

use crate::syntax::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, TokenStream, Trivia};

use super::whitespace::needs_separator;

use CsSyntaxKind::*;

/// Token offsets (modifiers, brace pairs) that can be removed without
/// changing semantics.
pub fn misc_simplifications(cst: &CsSyntaxNode) -> HashSet<u32> {
    let mut drops = HashSet::new();

    for node in cst.descendants() {
        match node.kind() {
            FieldDecl | MethodDecl | PropertyDecl | EventDecl => {
                if enclosing_type_defaults_private(&node) {
                    drop_redundant_modifier(&node, PrivateKw, &mut drops);
                }
            }
            TypeDecl => match node.parent().map(|p| p.kind()) {
                Some(TypeDecl) => {
                    if enclosing_type_defaults_private(&node) {
                        drop_redundant_modifier(&node, PrivateKw, &mut drops);
                    }
                }
                Some(CompilationUnit) | Some(NamespaceDecl) => {
                    drop_redundant_modifier(&node, InternalKw, &mut drops);
                }
                _ => {}
            },
            Block => {
                if let Some(parent_kind) = node.parent().map(|p| p.kind()) {
                    match parent_kind {
                        IfStmt | WhileStmt | DoStmt | ForStmt | ForeachStmt | UsingStmt
                        | LockStmt => {
                            try_unwrap_embedded_body(&node, false, &mut drops);
                        }
                        ElseClause => {
                            // `else { if ... }` may flatten to `else if`
                            try_unwrap_embedded_body(&node, true, &mut drops);
                        }
                        Block => try_flatten_bare_block(&node, &mut drops),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    drops
}

/// Members and nested types default to private only inside classes and
/// structs; interface members default to public, so their modifiers stay.
fn enclosing_type_defaults_private(node: &CsSyntaxNode) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if parent.kind() != TypeDecl {
        return false;
    }
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| matches!(t.kind(), ClassKw | StructKw))
}

fn drop_redundant_modifier(
    node: &CsSyntaxNode,
    modifier: CsSyntaxKind,
    drops: &mut HashSet<u32>,
) {
    let tokens: Vec<CsSyntaxToken> = node
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind().is_modifier())
        .collect();
    // `private protected` is a distinct accessibility, not a redundancy.
    if tokens.iter().any(|t| t.kind() == ProtectedKw) {
        return;
    }
    for token in tokens {
        if token.kind() == modifier {
            trace!(modifier = ?token.kind(), "dropping redundant access modifier");
            drops.insert(u32::from(token.text_range().start()));
        }
    }
}

const STATEMENT_KINDS: &[CsSyntaxKind] = &[
    Block, LocalDeclStmt, ExprStmt, EmptyStmt, IfStmt, WhileStmt, DoStmt, ForStmt, ForeachStmt,
    SwitchStmt, TryStmt, UsingStmt, ReturnStmt, ThrowStmt, BreakStmt, ContinueStmt, GotoStmt,
    LockStmt,
];

/// Unwrap `{ stmt; }` used as the body of a control statement when the
/// single statement is legal as an embedded statement on its own. Local
/// declarations never qualify, and a bare `if` is only unwrapped under an
/// `else` (anywhere else it could capture the outer `else`).
fn try_unwrap_embedded_body(block: &CsSyntaxNode, allow_if: bool, drops: &mut HashSet<u32>) {
    let statements: Vec<CsSyntaxNode> = block
        .children()
        .filter(|c| STATEMENT_KINDS.contains(&c.kind()))
        .collect();
    if statements.len() != 1 {
        return;
    }
    let ok = match statements[0].kind() {
        ExprStmt | ReturnStmt | ThrowStmt | BreakStmt | ContinueStmt => true,
        IfStmt => allow_if,
        _ => false,
    };
    if ok {
        drop_braces(block, drops);
    }
}

/// Flatten `{ ... }` nested directly in another block when nothing in it
/// declares a name in the dropped scope.
fn try_flatten_bare_block(block: &CsSyntaxNode, drops: &mut HashSet<u32>) {
    let declares = block
        .children()
        .any(|c| c.kind() == LocalDeclStmt);
    if !declares {
        drop_braces(block, drops);
    }
}

fn drop_braces(block: &CsSyntaxNode, drops: &mut HashSet<u32>) {
    let braces: Vec<CsSyntaxToken> = block
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| matches!(t.kind(), LBrace | RBrace))
        .collect();
    if let (Some(open), Some(close)) = (braces.first(), braces.last()) {
        if open.kind() == LBrace && close.kind() == RBrace {
            trace!("unwrapping redundant braces");
            drops.insert(u32::from(open.text_range().start()));
            drops.insert(u32::from(close.text_range().start()));
        }
    }
}

/// Remove the dropped tokens from the stream, folding their leading trivia
/// into the next token and keeping neighbors lexically separated.
pub fn apply_drops(stream: &mut TokenStream, drops: &HashSet<u32>) {
    if drops.is_empty() {
        return;
    }

    let mut result: Vec<crate::syntax::MinToken> = Vec::with_capacity(stream.tokens.len());
    let mut carried: Vec<Trivia> = Vec::new();
    let mut at_drop_boundary = false;

    for mut token in stream.tokens.drain(..) {
        if drops.contains(&token.offset) {
            let mut leading = std::mem::take(&mut token.leading);
            carried.append(&mut leading);
            at_drop_boundary = true;
            continue;
        }
        if !carried.is_empty() {
            let mut merged = std::mem::take(&mut carried);
            merged.append(&mut token.leading);
            token.leading = merged;
        }
        // A removal must not glue the new neighbors together; boundaries
        // the drop never touched stay exactly as they were.
        if at_drop_boundary && token.leading.is_empty() {
            if let (Some(prev), Some(next)) = (
                result
                    .last()
                    .and_then(|t: &crate::syntax::MinToken| t.text.chars().last()),
                token.text.chars().next(),
            ) {
                if needs_separator(prev, next) {
                    token.leading.push(Trivia::space());
                }
            }
        }
        at_drop_boundary = false;
        result.push(token);
    }

    stream.tokens = result;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{lex_with_trivia, parse};

    fn run(source: &str) -> String {
        let (cst, lex_errors, parse_errors) = parse(source);
        assert!(lex_errors.is_empty());
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        let drops = misc_simplifications(&cst);
        let (tokens, _) = lex_with_trivia(source);
        let mut stream = TokenStream::from_lexed(&tokens);
        apply_drops(&mut stream, &drops);
        stream.text()
    }

    #[test]
    fn test_private_member_modifier_dropped() {
        let out = run("class C { private int x; }");
        assert!(!out.contains("private"));
        assert!(out.contains("int x;"));
    }

    #[test]
    fn test_private_protected_untouched() {
        let out = run("class C { private protected int x; }");
        assert!(out.contains("private protected"));
    }

    #[test]
    fn test_internal_top_level_type_dropped() {
        let out = run("internal class C { }");
        assert!(!out.contains("internal"));
    }

    #[test]
    fn test_internal_nested_type_kept() {
        // Nested types default to private; `internal` there is meaningful.
        let out = run("class C { internal class N { } }");
        assert!(out.contains("internal"));
    }

    #[test]
    fn test_single_statement_if_body_unwrapped() {
        let out = run("class C { int M(bool b) { if (b) { return 1; } return 0; } }");
        assert_eq!(out.matches('{').count(), 2);
        assert_eq!(out.matches('}').count(), 2);
    }

    #[test]
    fn test_declaration_body_keeps_braces() {
        let out = run("class C { void M(bool b) { if (b) { int x = 1; } } }");
        assert_eq!(out.matches('{').count(), 3);
    }

    #[test]
    fn test_nested_if_keeps_braces_under_if() {
        // Unwrapping would re-bind the outer else
        let source =
            "class C { void M(bool a, bool b) { if (a) { if (b) F(); } else F(); } void F() { } }";
        let out = run(source);
        assert!(out.contains("{ if (b)"));
    }

    #[test]
    fn test_else_if_unwrapped() {
        let out = run("class C { void M(bool a, bool b) { if (a) { F(); } else { if (b) F(); } } void F() { } }");
        // Both the if body and the else body lose their braces, leaving the
        // class, M, and F pairs.
        assert_eq!(out.matches('{').count(), 3);
        assert!(out.contains("else"));
    }

    #[test]
    fn test_bare_block_without_declarations_flattened() {
        let out = run("class C { void M() { { F(); } } void F() { } }");
        assert_eq!(out.matches('{').count(), 3);
    }

    #[test]
    fn test_bare_block_with_declaration_kept() {
        let out = run("class C { void M() { { int x = 1; } } }");
        assert_eq!(out.matches('{').count(), 3);
    }

    #[test]
    fn test_literals_untouched() {
        let out = run("class C { private ulong m = 0x7048860F9180; private int n = 255; }");
        assert!(out.contains("0x7048860F9180"));
        assert!(out.contains("255"));
        assert!(!out.contains("private"));
    }
}
