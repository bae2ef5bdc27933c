//! Structural tree builder for C#
//!
//! Builds a lossless CST from the lexed token stream. The goal is scope and
//! declaration structure, not a full grammar: namespaces, types, members,
//! parameter lists, blocks and statements are modeled as nodes; expression
//! contents stay as token runs inside [`CsSyntaxKind::Expr`] nodes.
//!
//! Identifier classification is done here once so the resolver never has to
//! re-derive grammar: every `Ident` token ends up either
//! - wrapped in a `Name` node (it declares something),
//! - wrapped in a `NameRef` node (it references something), or
//! - bare (contextual grammar words such as accessor names or `partial`).
//!
//! Structural malformations (unbalanced delimiters, a declaration header the
//! grammar cannot accept) are collected as [`ParseError`]s; the engine treats
//! any of them as fatal for the invocation.

use super::builder::CstBuilder;
use super::lexer::{CsSpan, CsToken, LexError, lex_with_trivia};
use super::{CsSyntaxKind, CsSyntaxNode};

use CsSyntaxKind::*;

/// A structural parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: CsSpan,
}

impl ParseError {
    fn new(message: impl Into<String>, span: CsSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Parse C# source into a lossless CST.
///
/// Always returns a tree covering the full input (`cst.text() == source`);
/// the error vectors decide whether the result is usable.
pub fn parse(source: &str) -> (CsSyntaxNode, Vec<LexError>, Vec<ParseError>) {
    let (tokens, lex_errors) = lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_compilation_unit();
    let (node, parse_errors) = parser.finish();
    (node, lex_errors, parse_errors)
}

/// Token stream parser.
struct Parser<'a> {
    tokens: &'a [CsToken],
    pos: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CsToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (CsSyntaxNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // === Cursor helpers ===

    /// Index of the n-th significant (non-trivia) token at or after `pos`.
    fn sig_index(&self, n: usize) -> usize {
        let mut idx = self.pos;
        let mut remaining = n;
        loop {
            if idx >= self.tokens.len() {
                return self.tokens.len() - 1; // EOF token
            }
            if self.tokens[idx].kind.is_trivia() {
                idx += 1;
                continue;
            }
            if remaining == 0 {
                return idx;
            }
            remaining -= 1;
            idx += 1;
        }
    }

    fn sig_kind(&self, n: usize) -> CsSyntaxKind {
        self.tokens[self.sig_index(n)].kind
    }

    fn sig_text(&self, n: usize) -> &str {
        &self.tokens[self.sig_index(n)].text
    }

    fn current_span(&self) -> CsSpan {
        self.tokens[self.sig_index(0)].span.clone()
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.sig_kind(0) == kind
    }

    fn at_eof(&self) -> bool {
        self.at(Eof)
    }

    fn at_contextual(&self, word: &str) -> bool {
        self.at(Ident) && self.sig_text(0) == word
    }

    /// Emit pending trivia tokens into the currently open node.
    fn bump_trivia(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            let t = &self.tokens[self.pos];
            self.builder.token(t.kind, &t.text);
            self.pos += 1;
        }
    }

    /// Emit the current significant token as-is.
    fn bump(&mut self) {
        self.bump_trivia();
        if self.pos >= self.tokens.len() {
            return;
        }
        let t = &self.tokens[self.pos];
        if t.kind == Eof {
            return;
        }
        self.builder.token(t.kind, &t.text);
        self.pos += 1;
    }

    /// Emit the current identifier wrapped in a `Name` or `NameRef` node.
    fn bump_wrapped(&mut self, wrapper: CsSyntaxKind) {
        self.bump_trivia();
        self.builder.start_node(wrapper);
        self.bump();
        self.builder.finish_node();
    }

    fn expect(&mut self, kind: CsSyntaxKind) {
        if self.at(kind) {
            self.bump();
        } else {
            self.error(format!(
                "expected {:?}, found {:?}",
                kind,
                self.sig_kind(0)
            ));
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ParseError::new(message, self.current_span()));
    }

    /// Emit the current token and record it as unexpected.
    fn error_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if !self.at_eof() {
            self.bump();
        }
    }

    // === Type lookahead ===
    //
    // Scans over significant token indices without consuming anything.
    // Returns the significant index one past the type, or None when the
    // tokens cannot start a type.

    fn scan_type(&self, n: usize) -> Option<usize> {
        let mut n = n;
        match self.sig_kind(n) {
            k if k.is_predefined_type() => n += 1,
            Ident => {
                n += 1;
                if self.sig_kind(n) == Lt {
                    n = self.scan_generic_args(n)?;
                }
                while self.sig_kind(n) == Dot && self.sig_kind(n + 1) == Ident {
                    n += 2;
                    if self.sig_kind(n) == Lt {
                        n = self.scan_generic_args(n)?;
                    }
                }
            }
            _ => return None,
        }

        // Nullable / array / pointer suffixes
        loop {
            match self.sig_kind(n) {
                Question => n += 1,
                LBracket => {
                    let mut m = n + 1;
                    while self.sig_kind(m) == Comma {
                        m += 1;
                    }
                    if self.sig_kind(m) == RBracket {
                        n = m + 1;
                    } else {
                        break;
                    }
                }
                Star => n += 1,
                _ => break,
            }
        }
        Some(n)
    }

    fn scan_generic_args(&self, n: usize) -> Option<usize> {
        debug_assert_eq!(self.sig_kind(n), Lt);
        let mut n = n + 1;
        loop {
            n = self.scan_type(n)?;
            match self.sig_kind(n) {
                Comma => n += 1,
                Gt => return Some(n + 1),
                _ => return None,
            }
        }
    }

    /// Emit exactly `count` significant tokens, wrapping identifiers in
    /// `NameRef` nodes. Used for type positions after a successful scan.
    fn bump_type_tokens(&mut self, count: usize) {
        let mut consumed = 0;
        while consumed < count {
            if self.at(Ident) {
                self.bump_wrapped(NameRef);
            } else {
                self.bump();
            }
            consumed += 1;
        }
    }

    /// Number of significant tokens the type at the cursor spans, if any.
    fn type_len(&self) -> Option<usize> {
        self.scan_type(0)
    }

    // === Top level ===

    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(CompilationUnit);

        loop {
            self.bump_trivia();
            if self.at_eof() {
                break;
            }
            match self.sig_kind(0) {
                UsingKw => self.parse_using_directive(),
                NamespaceKw => self.parse_namespace(),
                RBrace => {
                    self.error_and_bump("unbalanced '}' at top level");
                }
                _ => self.parse_declaration(false),
            }
        }

        self.bump_trivia();
        self.builder.finish_node();
    }

    fn parse_using_directive(&mut self) {
        self.builder.start_node(UsingDirective);
        self.expect(UsingKw);
        if self.at(StaticKw) {
            self.bump();
        }
        // `using Alias = Namespace.Type;` or `using Namespace.Sub;`
        let mut guard = 0;
        while !self.at(Semicolon) && !self.at_eof() && guard < 1000 {
            guard += 1;
            if self.at(Ident) {
                self.bump_wrapped(NameRef);
            } else {
                self.bump();
            }
        }
        self.expect(Semicolon);
        self.builder.finish_node();
    }

    fn parse_namespace(&mut self) {
        self.builder.start_node(NamespaceDecl);
        self.expect(NamespaceKw);

        self.builder.start_node(QualifiedName);
        let mut guard = 0;
        while guard < 1000 {
            guard += 1;
            if self.at(Ident) {
                self.bump_wrapped(Name);
            } else {
                break;
            }
            if self.at(Dot) {
                self.bump();
            } else {
                break;
            }
        }
        self.builder.finish_node();

        if self.at(Semicolon) {
            // File-scoped namespace; the rest of the file parses at top level.
            self.bump();
            self.builder.finish_node();
            return;
        }

        self.expect(LBrace);
        loop {
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            match self.sig_kind(0) {
                UsingKw => self.parse_using_directive(),
                NamespaceKw => self.parse_namespace(),
                _ => self.parse_declaration(false),
            }
        }
        if self.at_eof() {
            self.error("unexpected end of file in namespace, expected '}'");
        }
        self.expect(RBrace);
        self.builder.finish_node();
    }

    // === Declarations ===

    /// Parse a type or member declaration. `in_type_body` enables member
    /// forms (fields, methods, properties, events).
    fn parse_declaration(&mut self, in_type_body: bool) {
        self.bump_trivia();
        let cp = self.builder.checkpoint();

        while self.at(LBracket) {
            self.parse_attribute_list();
            self.bump_trivia();
        }

        // Modifier run, including contextual `partial`
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 100 {
                break;
            }
            if self.sig_kind(0).is_modifier() {
                self.bump();
                self.bump_trivia();
            } else if self.at_contextual("partial")
                && matches!(self.sig_kind(1), ClassKw | StructKw | InterfaceKw)
            {
                self.bump();
                self.bump_trivia();
            } else {
                break;
            }
        }

        match self.sig_kind(0) {
            ClassKw | StructKw | InterfaceKw => self.parse_type_body(cp),
            EnumKw => self.parse_enum_body(cp),
            DelegateKw => self.parse_delegate(cp),
            _ if in_type_body => self.parse_member(cp),
            _ => {
                self.error_and_bump("expected a type declaration");
            }
        }
    }

    fn parse_type_body(&mut self, cp: rowan::Checkpoint) {
        self.builder.start_node_at(cp, TypeDecl);
        self.bump(); // class/struct/interface keyword
        if self.at(Ident) {
            self.bump_wrapped(Name);
        } else {
            self.error("expected type name");
        }
        if self.at(Lt) {
            self.parse_type_param_list();
        }
        if self.at(Colon) {
            self.parse_base_list();
        }
        self.skip_where_clauses(&[LBrace]);

        self.expect(LBrace);
        loop {
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            match self.sig_kind(0) {
                Semicolon => {
                    self.builder.start_node(EmptyStmt);
                    self.bump();
                    self.builder.finish_node();
                }
                _ => self.parse_declaration(true),
            }
        }
        if self.at_eof() {
            self.error("unexpected end of file in type body, expected '}'");
        }
        self.expect(RBrace);
        if self.at(Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
    }

    fn parse_enum_body(&mut self, cp: rowan::Checkpoint) {
        self.builder.start_node_at(cp, TypeDecl);
        self.expect(EnumKw);
        if self.at(Ident) {
            self.bump_wrapped(Name);
        } else {
            self.error("expected enum name");
        }
        if self.at(Colon) {
            self.bump();
            if let Some(len) = self.type_len() {
                self.bump_type_tokens(len);
            }
        }
        self.expect(LBrace);
        loop {
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            self.builder.start_node(EnumMember);
            while self.at(LBracket) {
                self.parse_attribute_list();
                self.bump_trivia();
            }
            if self.at(Ident) {
                self.bump_wrapped(Name);
            } else {
                self.error_and_bump("expected enum member name");
                self.builder.finish_node();
                continue;
            }
            if self.at(Eq) {
                self.bump();
                self.parse_expr_until(&[Comma, RBrace]);
            }
            self.builder.finish_node();
            if self.at(Comma) {
                self.bump();
            }
        }
        if self.at_eof() {
            self.error("unexpected end of file in enum body, expected '}'");
        }
        self.expect(RBrace);
        if self.at(Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
    }

    /// `delegate ReturnType Name(params);` — a type-shaped declaration.
    /// Parameter identifiers are left as plain names; delegate parameter
    /// names are part of the callable surface (named arguments) and are
    /// never renamed.
    fn parse_delegate(&mut self, cp: rowan::Checkpoint) {
        self.builder.start_node_at(cp, TypeDecl);
        self.expect(DelegateKw);
        if let Some(len) = self.type_len() {
            self.bump_type_tokens(len);
        }
        if self.at(Ident) {
            self.bump_wrapped(Name);
        }
        if self.at(Lt) {
            self.parse_type_param_list();
        }
        if self.at(LParen) {
            self.parse_param_list(false);
        }
        self.skip_where_clauses(&[Semicolon]);
        self.expect(Semicolon);
        self.builder.finish_node();
    }

    fn parse_type_param_list(&mut self) {
        self.builder.start_node(TypeParamList);
        self.expect(Lt);
        let mut guard = 0;
        while !self.at(Gt) && !self.at_eof() && guard < 1000 {
            guard += 1;
            if self.at(LBracket) {
                self.parse_attribute_list();
            } else if self.at(InKw) || self.at(OutKw) {
                self.bump(); // variance annotation
            } else if self.at(Ident) {
                self.builder.start_node(TypeParam);
                self.bump_wrapped(Name);
                self.builder.finish_node();
            } else if self.at(Comma) {
                self.bump();
            } else {
                self.error_and_bump("unexpected token in type parameter list");
            }
        }
        self.expect(Gt);
        self.builder.finish_node();
    }

    fn parse_base_list(&mut self) {
        self.builder.start_node(BaseList);
        self.expect(Colon);
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 1000 {
                break;
            }
            match self.type_len() {
                Some(len) => self.bump_type_tokens(len),
                None => break,
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.builder.finish_node();
    }

    /// Consume `where T : ...` clauses; stops before any kind in `stops`.
    fn skip_where_clauses(&mut self, stops: &[CsSyntaxKind]) {
        while self.at_contextual("where") {
            self.bump(); // `where` stays a bare token
            let mut guard = 0;
            loop {
                guard += 1;
                if guard > 1000 || self.at_eof() {
                    return;
                }
                if stops.contains(&self.sig_kind(0)) || self.at_contextual("where") {
                    break;
                }
                if self.at(Ident) {
                    self.bump_wrapped(NameRef);
                } else {
                    self.bump();
                }
            }
        }
    }

    fn parse_attribute_list(&mut self) {
        self.builder.start_node(AttributeList);
        self.expect(LBracket);
        let mut depth = 1usize;
        let mut guard = 0;
        while depth > 0 && !self.at_eof() && guard < 10_000 {
            guard += 1;
            match self.sig_kind(0) {
                LBracket => {
                    depth += 1;
                    self.bump();
                }
                RBracket => {
                    depth -= 1;
                    self.bump();
                }
                Ident => self.bump_wrapped(NameRef),
                _ => self.bump(),
            }
        }
        if depth > 0 {
            self.error("unterminated attribute list");
        }
        self.builder.finish_node();
    }

    // === Members ===

    /// Member inside a type body, with attributes and modifiers already
    /// consumed under the checkpoint.
    fn parse_member(&mut self, cp: rowan::Checkpoint) {
        // Event declarations
        if self.at(EventKw) {
            self.parse_event(cp);
            return;
        }

        // Conversion operators: implicit/explicit operator Type(...)
        if (self.at(ImplicitKw) || self.at(ExplicitKw)) && self.sig_kind(1) == OperatorKw {
            self.builder.start_node_at(cp, MethodDecl);
            self.bump();
            self.bump();
            if let Some(len) = self.type_len() {
                self.bump_type_tokens(len);
            }
            if self.at(LParen) {
                self.parse_param_list(true);
            }
            self.parse_method_tail();
            self.builder.finish_node();
            return;
        }

        // Destructor: ~Name() { ... }
        if self.at(Tilde) && self.sig_kind(1) == Ident {
            self.builder.start_node_at(cp, MethodDecl);
            self.bump();
            self.bump_wrapped(NameRef); // occurrence of the type name
            if self.at(LParen) {
                self.parse_param_list(true);
            }
            self.parse_method_tail();
            self.builder.finish_node();
            return;
        }

        // Constructor: Name(...) where Name is an identifier directly
        // followed by '('. The identifier is a reference to the enclosing
        // type symbol, so a renamed type renames its constructors too.
        if self.at(Ident) && self.sig_kind(1) == LParen {
            self.builder.start_node_at(cp, MethodDecl);
            self.bump_wrapped(NameRef);
            self.parse_param_list(true);
            // Constructor initializer `: base(...)` / `: this(...)`
            if self.at(Colon) && matches!(self.sig_kind(1), BaseKw | ThisKw) {
                self.bump();
                self.bump();
                if self.at(LParen) {
                    self.parse_parenthesized_expr();
                }
            }
            self.parse_method_tail();
            self.builder.finish_node();
            return;
        }

        let type_end = match self.type_len() {
            Some(len) if len > 0 => len,
            _ => {
                self.error_and_bump("malformed member declaration");
                return;
            }
        };

        // Operator overload: Type operator <op>(...)
        if self.sig_kind(type_end) == OperatorKw {
            self.builder.start_node_at(cp, MethodDecl);
            self.bump_type_tokens(type_end);
            self.bump(); // operator
            while !self.at(LParen) && !self.at_eof() {
                self.bump(); // the operator token(s)
            }
            if self.at(LParen) {
                self.parse_param_list(true);
            }
            self.parse_method_tail();
            self.builder.finish_node();
            return;
        }

        // Indexer: Type this[...] { ... }
        if self.sig_kind(type_end) == ThisKw {
            self.builder.start_node_at(cp, PropertyDecl);
            self.bump_type_tokens(type_end);
            self.bump(); // this
            if self.at(LBracket) {
                self.parse_bracketed_param_list();
            }
            if self.at(LBrace) {
                self.parse_accessor_list();
            } else if self.at(FatArrow) {
                self.bump();
                self.parse_expr_until(&[Semicolon]);
                self.expect(Semicolon);
            }
            self.builder.finish_node();
            return;
        }

        if self.sig_kind(type_end) != Ident {
            self.error_and_bump("malformed member declaration");
            return;
        }

        // Explicit interface implementation: Type IFace.Member(...)
        // The qualifying segments are references; the final segment stays a
        // plain name so it never becomes a renameable declaration.
        let mut name_at = type_end;
        let mut explicit_impl = false;
        while self.sig_kind(name_at + 1) == Dot && self.sig_kind(name_at + 2) == Ident {
            explicit_impl = true;
            name_at += 2;
        }

        match self.sig_kind(name_at + 1) {
            LParen | Lt => {
                self.builder.start_node_at(cp, MethodDecl);
                self.bump_type_tokens(type_end);
                self.bump_member_name(name_at - type_end, explicit_impl);
                if self.at(Lt) {
                    self.parse_type_param_list();
                }
                if self.at(LParen) {
                    self.parse_param_list(true);
                }
                self.skip_where_clauses(&[LBrace, Semicolon, FatArrow]);
                self.parse_method_tail();
                self.builder.finish_node();
            }
            LBrace | FatArrow => {
                self.builder.start_node_at(cp, PropertyDecl);
                self.bump_type_tokens(type_end);
                self.bump_member_name(name_at - type_end, explicit_impl);
                if self.at(LBrace) {
                    self.parse_accessor_list();
                    // Auto-property initializer: `{ get; } = expr;`
                    if self.at(Eq) {
                        self.bump();
                        self.parse_expr_until(&[Semicolon]);
                        self.expect(Semicolon);
                    }
                } else {
                    self.bump(); // =>
                    self.parse_expr_until(&[Semicolon]);
                    self.expect(Semicolon);
                }
                self.builder.finish_node();
            }
            Eq | Semicolon | Comma => {
                self.builder.start_node_at(cp, FieldDecl);
                self.bump_type_tokens(type_end);
                let mut guard = 0;
                loop {
                    guard += 1;
                    if guard > 1000 {
                        break;
                    }
                    if self.at(Ident) {
                        self.bump_wrapped(Name);
                    } else {
                        self.error("expected field name");
                        break;
                    }
                    if self.at(Eq) {
                        self.bump();
                        self.parse_expr_until(&[Comma, Semicolon]);
                    }
                    if self.at(Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            _ => {
                self.error_and_bump("malformed member declaration");
            }
        }
    }

    /// Emit a member name that may be preceded by explicit-interface
    /// qualification (`IFace.Member`). `extra` is the number of significant
    /// tokens before the final identifier.
    fn bump_member_name(&mut self, extra: usize, explicit_impl: bool) {
        let mut remaining = extra;
        while remaining > 0 {
            if self.at(Ident) {
                self.bump_wrapped(NameRef);
            } else {
                self.bump(); // the dot
            }
            remaining -= 1;
        }
        if explicit_impl {
            // Keep the final segment bare: explicit implementations are
            // bound to the interface member, never renamed independently.
            self.bump();
        } else {
            self.bump_wrapped(Name);
        }
    }

    /// Method body: block, expression body, or none (abstract/interface).
    fn parse_method_tail(&mut self) {
        self.bump_trivia();
        match self.sig_kind(0) {
            LBrace => self.parse_block(),
            FatArrow => {
                self.bump();
                self.parse_expr_until(&[Semicolon]);
                self.expect(Semicolon);
            }
            Semicolon => self.bump(),
            _ => self.error("expected method body, '=>' or ';'"),
        }
    }

    fn parse_event(&mut self, cp: rowan::Checkpoint) {
        self.builder.start_node_at(cp, EventDecl);
        self.expect(EventKw);
        if let Some(len) = self.type_len() {
            self.bump_type_tokens(len);
        }
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 1000 {
                break;
            }
            if self.at(Ident) {
                self.bump_wrapped(Name);
            } else {
                break;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        if self.at(LBrace) {
            // add/remove accessors
            self.parse_accessor_list();
        } else {
            if self.at(Eq) {
                self.bump();
                self.parse_expr_until(&[Semicolon]);
            }
            self.expect(Semicolon);
        }
        self.builder.finish_node();
    }

    fn parse_accessor_list(&mut self) {
        self.builder.start_node(AccessorList);
        self.expect(LBrace);
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 1000 {
                break;
            }
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            while self.at(LBracket) {
                self.parse_attribute_list();
                self.bump_trivia();
            }
            while self.sig_kind(0).is_modifier() {
                self.bump();
                self.bump_trivia();
            }
            // get / set / init / add / remove stay bare tokens
            if self.at(Ident) {
                self.bump();
            } else {
                self.error_and_bump("expected accessor name");
                continue;
            }
            self.bump_trivia();
            match self.sig_kind(0) {
                Semicolon => self.bump(),
                LBrace => self.parse_block(),
                FatArrow => {
                    self.bump();
                    self.parse_expr_until(&[Semicolon]);
                    self.expect(Semicolon);
                }
                _ => self.error("expected ';', '{' or '=>' after accessor name"),
            }
        }
        if self.at_eof() {
            self.error("unexpected end of file in accessor list, expected '}'");
        }
        self.expect(RBrace);
        self.builder.finish_node();
    }

    // === Parameters ===

    fn parse_param_list(&mut self, declare: bool) {
        self.builder.start_node(ParamList);
        self.expect(LParen);
        self.parse_params_until(RParen, declare);
        self.expect(RParen);
        self.builder.finish_node();
    }

    /// Indexer parameters: `this[int index]`.
    fn parse_bracketed_param_list(&mut self) {
        self.builder.start_node(ParamList);
        self.expect(LBracket);
        self.parse_params_until(RBracket, true);
        self.expect(RBracket);
        self.builder.finish_node();
    }

    fn parse_params_until(&mut self, close: CsSyntaxKind, declare: bool) {
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 1000 {
                break;
            }
            self.bump_trivia();
            if self.at(close) || self.at_eof() {
                break;
            }
            self.builder.start_node(Param);
            while self.at(LBracket) {
                self.parse_attribute_list();
                self.bump_trivia();
            }
            while matches!(self.sig_kind(0), RefKw | OutKw | InKw | ParamsKw | ThisKw) {
                self.bump();
                self.bump_trivia();
            }
            match self.type_len() {
                Some(len) if self.sig_kind(len) == Ident => {
                    self.bump_type_tokens(len);
                    if declare {
                        self.bump_wrapped(Name);
                    } else {
                        self.bump();
                    }
                    if self.at(Eq) {
                        self.bump();
                        self.parse_expr_until(&[Comma, close]);
                    }
                }
                _ => {
                    // Not a recognizable parameter; consume to the next
                    // separator so the list stays balanced.
                    while !self.at(Comma) && !self.at(close) && !self.at_eof() {
                        if self.at(Ident) {
                            self.bump_wrapped(NameRef);
                        } else {
                            self.bump();
                        }
                    }
                }
            }
            self.builder.finish_node();
            if self.at(Comma) {
                self.bump();
            }
        }
    }

    // === Statements ===

    fn parse_block(&mut self) {
        self.builder.start_node(Block);
        self.expect(LBrace);
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 100_000 {
                break;
            }
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            self.parse_statement();
        }
        if self.at_eof() {
            self.error("unexpected end of file, expected '}'");
        }
        self.expect(RBrace);
        self.builder.finish_node();
    }

    fn parse_statement(&mut self) {
        self.bump_trivia();
        match self.sig_kind(0) {
            LBrace => self.parse_block(),
            Semicolon => {
                self.builder.start_node(EmptyStmt);
                self.bump();
                self.builder.finish_node();
            }
            IfKw => self.parse_if(),
            WhileKw => {
                self.builder.start_node(WhileStmt);
                self.bump();
                self.parse_parenthesized_expr();
                self.parse_statement();
                self.builder.finish_node();
            }
            DoKw => {
                self.builder.start_node(DoStmt);
                self.bump();
                self.parse_statement();
                self.expect(WhileKw);
                self.parse_parenthesized_expr();
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            ForKw => self.parse_for(),
            ForeachKw => self.parse_foreach(),
            SwitchKw => self.parse_switch(),
            TryKw => self.parse_try(),
            UsingKw => self.parse_using_statement(),
            LockKw => {
                self.builder.start_node(LockStmt);
                self.bump();
                self.parse_parenthesized_expr();
                self.parse_statement();
                self.builder.finish_node();
            }
            ReturnKw => {
                self.builder.start_node(ReturnStmt);
                self.bump();
                if !self.at(Semicolon) {
                    self.parse_expr_until(&[Semicolon]);
                }
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            ThrowKw => {
                self.builder.start_node(ThrowStmt);
                self.bump();
                if !self.at(Semicolon) {
                    self.parse_expr_until(&[Semicolon]);
                }
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            BreakKw => {
                self.builder.start_node(BreakStmt);
                self.bump();
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            ContinueKw => {
                self.builder.start_node(ContinueStmt);
                self.bump();
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            GotoKw => {
                self.builder.start_node(GotoStmt);
                self.bump();
                while !self.at(Semicolon) && !self.at_eof() {
                    self.bump();
                }
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            ConstKw => {
                self.builder.start_node(LocalDeclStmt);
                self.bump();
                self.parse_local_declarators();
                self.expect(Semicolon);
                self.builder.finish_node();
            }
            _ => {
                if self.local_decl_ahead() {
                    self.builder.start_node(LocalDeclStmt);
                    self.parse_local_declarators();
                    self.expect(Semicolon);
                    self.builder.finish_node();
                } else {
                    self.builder.start_node(ExprStmt);
                    self.parse_expr_until(&[Semicolon]);
                    self.expect(Semicolon);
                    self.builder.finish_node();
                }
            }
        }
    }

    /// True when the cursor starts `Type name = ...`, `Type name;` or
    /// `Type name, ...` — a local variable declaration rather than an
    /// expression statement.
    fn local_decl_ahead(&self) -> bool {
        match self.type_len() {
            Some(len) if len > 0 => {
                self.sig_kind(len) == Ident
                    && matches!(self.sig_kind(len + 1), Eq | Semicolon | Comma)
            }
            _ => false,
        }
    }

    /// Type followed by one or more `name [= initializer]` declarators.
    fn parse_local_declarators(&mut self) {
        if let Some(len) = self.type_len() {
            self.bump_type_tokens(len);
        }
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 1000 {
                break;
            }
            if self.at(Ident) {
                self.bump_wrapped(Name);
            } else {
                self.error("expected variable name");
                break;
            }
            if self.at(Eq) {
                self.bump();
                self.parse_expr_until(&[Comma, Semicolon]);
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn parse_if(&mut self) {
        self.builder.start_node(IfStmt);
        self.expect(IfKw);
        self.parse_parenthesized_expr();
        self.parse_statement();
        self.bump_trivia();
        if self.at(ElseKw) {
            self.builder.start_node(ElseClause);
            self.bump();
            self.parse_statement();
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn parse_for(&mut self) {
        self.builder.start_node(ForStmt);
        self.expect(ForKw);
        self.expect(LParen);
        if !self.at(Semicolon) {
            if self.local_decl_ahead() {
                self.builder.start_node(LocalDeclStmt);
                self.parse_local_declarators();
                self.builder.finish_node();
            } else {
                self.parse_expr_until(&[Semicolon]);
            }
        }
        self.expect(Semicolon);
        if !self.at(Semicolon) {
            self.parse_expr_until(&[Semicolon]);
        }
        self.expect(Semicolon);
        if !self.at(RParen) {
            self.parse_expr_until(&[RParen]);
        }
        self.expect(RParen);
        self.parse_statement();
        self.builder.finish_node();
    }

    fn parse_foreach(&mut self) {
        self.builder.start_node(ForeachStmt);
        self.expect(ForeachKw);
        self.expect(LParen);
        if let Some(len) = self.type_len() {
            self.bump_type_tokens(len);
        }
        if self.at(Ident) {
            self.bump_wrapped(Name);
        } else {
            self.error("expected loop variable name");
        }
        self.expect(InKw);
        self.parse_expr_until(&[RParen]);
        self.expect(RParen);
        self.parse_statement();
        self.builder.finish_node();
    }

    fn parse_switch(&mut self) {
        self.builder.start_node(SwitchStmt);
        self.expect(SwitchKw);
        self.parse_parenthesized_expr();
        self.expect(LBrace);
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 10_000 {
                break;
            }
            self.bump_trivia();
            if self.at(RBrace) || self.at_eof() {
                break;
            }
            match self.sig_kind(0) {
                CaseKw => {
                    self.bump();
                    self.parse_expr_until(&[Colon]);
                    self.expect(Colon);
                }
                DefaultKw => {
                    self.bump();
                    self.expect(Colon);
                }
                _ => self.parse_statement(),
            }
        }
        if self.at_eof() {
            self.error("unexpected end of file in switch, expected '}'");
        }
        self.expect(RBrace);
        self.builder.finish_node();
    }

    fn parse_try(&mut self) {
        self.builder.start_node(TryStmt);
        self.expect(TryKw);
        self.parse_block();
        let mut guard = 0;
        while self.at_after_trivia(CatchKw) && guard < 100 {
            guard += 1;
            self.builder.start_node(CatchClause);
            self.bump();
            if self.at(LParen) {
                self.bump();
                if let Some(len) = self.type_len() {
                    self.bump_type_tokens(len);
                }
                if self.at(Ident) {
                    self.bump_wrapped(Name);
                }
                self.expect(RParen);
            }
            // when-filter: `catch (E e) when (cond)`
            if self.at_contextual("when") {
                self.bump();
                self.parse_parenthesized_expr();
            }
            self.parse_block();
            self.builder.finish_node();
        }
        if self.at_after_trivia(FinallyKw) {
            self.builder.start_node(FinallyClause);
            self.bump();
            self.parse_block();
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn parse_using_statement(&mut self) {
        self.builder.start_node(UsingStmt);
        self.expect(UsingKw);
        if self.at(LParen) {
            self.bump();
            if self.local_decl_ahead() {
                self.builder.start_node(LocalDeclStmt);
                self.parse_local_declarators();
                self.builder.finish_node();
            } else {
                self.parse_expr_until(&[RParen]);
            }
            self.expect(RParen);
            self.parse_statement();
        } else {
            // using-declaration form: `using var x = ...;`
            self.builder.start_node(LocalDeclStmt);
            self.parse_local_declarators();
            self.builder.finish_node();
            self.expect(Semicolon);
        }
        self.builder.finish_node();
    }

    fn at_after_trivia(&self, kind: CsSyntaxKind) -> bool {
        self.sig_kind(0) == kind
    }

    // === Expressions ===

    /// `( expr )` with the parens included.
    fn parse_parenthesized_expr(&mut self) {
        self.expect(LParen);
        self.parse_expr_until(&[RParen]);
        self.expect(RParen);
    }

    /// Consume an expression token run until one of `stops` appears at
    /// delimiter depth zero. Identifiers become `NameRef` nodes; everything
    /// else is kept as bare tokens. The run is wrapped in an `Expr` node.
    fn parse_expr_until(&mut self, stops: &[CsSyntaxKind]) {
        self.builder.start_node(Expr);
        let mut depth = 0usize;
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 100_000 {
                break;
            }
            self.bump_trivia();
            let kind = self.sig_kind(0);
            if kind == Eof {
                self.error("unexpected end of file in expression");
                break;
            }
            if depth == 0 && stops.contains(&kind) {
                break;
            }
            match kind {
                LParen | LBracket | LBrace => {
                    depth += 1;
                    self.bump();
                }
                RParen | RBracket | RBrace => {
                    if depth == 0 {
                        // Unbalanced close belongs to an outer construct.
                        self.error(format!("unbalanced {kind:?} in expression"));
                        break;
                    }
                    depth -= 1;
                    self.bump();
                }
                Ident => self.bump_wrapped(NameRef),
                _ => self.bump(),
            }
        }
        self.builder.finish_node();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> CsSyntaxNode {
        let (node, lex_errors, parse_errors) = parse(source);
        assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
        assert!(parse_errors.is_empty(), "parse errors: {parse_errors:?}");
        node
    }

    fn kinds_of(node: &CsSyntaxNode, kind: CsSyntaxKind) -> usize {
        node.descendants().filter(|n| n.kind() == kind).count()
    }

    #[test]
    fn test_lossless_tree() {
        let source = "using System;\n\nnamespace N\n{\n\tclass C\n\t{\n\t\tint x = 1; // f\n\t}\n}\n";
        let node = parse_ok(source);
        assert_eq!(node.text().to_string(), source);
    }

    #[test]
    fn test_namespace_and_type_nesting() {
        let node = parse_ok("namespace A { class B { class C { } } }");
        assert_eq!(kinds_of(&node, NamespaceDecl), 1);
        assert_eq!(kinds_of(&node, TypeDecl), 2);
    }

    #[test]
    fn test_member_classification() {
        let source = r#"
class C
{
    int field1, field2 = 2;
    string Prop { get; set; }
    void M(int p) { }
    event System.EventHandler Changed;
}
"#;
        let node = parse_ok(source);
        assert_eq!(kinds_of(&node, FieldDecl), 1);
        assert_eq!(kinds_of(&node, PropertyDecl), 1);
        assert_eq!(kinds_of(&node, MethodDecl), 1);
        assert_eq!(kinds_of(&node, EventDecl), 1);
        assert_eq!(kinds_of(&node, Param), 1);
    }

    #[test]
    fn test_local_declarations_vs_expressions() {
        let source = r#"
class C
{
    void M()
    {
        int x = 1;
        var y = x + 1;
        x = y;
        Helper(x);
    }
    void Helper(int v) { }
}
"#;
        let node = parse_ok(source);
        assert_eq!(kinds_of(&node, LocalDeclStmt), 2);
        assert_eq!(kinds_of(&node, ExprStmt), 2);
    }

    #[test]
    fn test_generic_type_local() {
        let source = "class C { void M() { System.Collections.Generic.List<int> list = null; } }";
        let node = parse_ok(source);
        assert_eq!(kinds_of(&node, LocalDeclStmt), 1);
    }

    #[test]
    fn test_comparison_is_not_a_declaration() {
        // `a < b` must not be mistaken for a generic type
        let source = "class C { void M(int a, int b) { if (a < b) return; } }";
        let node = parse_ok(source);
        assert_eq!(kinds_of(&node, LocalDeclStmt), 0);
        assert_eq!(kinds_of(&node, IfStmt), 1);
    }

    #[test]
    fn test_constructor_name_is_a_reference() {
        let source = "class Widget { Widget() { } }";
        let node = parse_ok(source);
        let method = node
            .descendants()
            .find(|n| n.kind() == MethodDecl)
            .expect("constructor node");
        assert_eq!(kinds_of(&method, NameRef), 1);
        assert_eq!(kinds_of(&method, Name), 0);
    }

    #[test]
    fn test_enum_members() {
        let node = parse_ok("enum E { A, B = 2, C }");
        assert_eq!(kinds_of(&node, EnumMember), 3);
    }

    #[test]
    fn test_foreach_declares_loop_variable() {
        let source = "class C { void M(int[] xs) { foreach (var x in xs) { } } }";
        let node = parse_ok(source);
        let stmt = node
            .descendants()
            .find(|n| n.kind() == ForeachStmt)
            .expect("foreach node");
        assert!(stmt.descendants().any(|n| n.kind() == Name));
    }

    #[test]
    fn test_unbalanced_brace_is_parse_error() {
        let (_, lex_errors, parse_errors) = parse("class C { void M() { ");
        assert!(lex_errors.is_empty());
        assert!(!parse_errors.is_empty());
    }

    #[test]
    fn test_stray_close_brace_is_parse_error() {
        let (_, _, parse_errors) = parse("}");
        assert!(!parse_errors.is_empty());
    }

    #[test]
    fn test_accessor_names_stay_bare() {
        let node = parse_ok("class C { int P { get; set; } }");
        let prop = node
            .descendants()
            .find(|n| n.kind() == PropertyDecl)
            .expect("property node");
        // Only the property name itself is a Name; get/set are bare
        assert_eq!(kinds_of(&prop, Name), 1);
    }

    #[test]
    fn test_attribute_list_parsed() {
        let node = parse_ok("[Serializable]\nclass C { }");
        assert_eq!(kinds_of(&node, AttributeList), 1);
    }

    #[test]
    fn test_regions_survive_in_tree() {
        let source = "class C\n{\n#region Fields\nint x;\n#endregion\n}";
        let node = parse_ok(source);
        assert_eq!(node.text().to_string(), source);
    }
}
