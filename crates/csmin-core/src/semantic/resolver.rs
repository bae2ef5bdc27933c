//! Symbol resolution over the lossless CST
//!
//! A deliberately lightweight binder: lexical scope resolution plus explicit
//! modifier inspection, no type checking. Anything that would need overload,
//! generic, or receiver-type resolution falls back to "not resolvable, so
//! not renameable" — the resolver never guesses.
//!
//! Three phases:
//! 1. declare namespaces, types, and members (forward references are legal
//!    in C#, so these must exist before any body is bound),
//! 2. bind every `NameRef` and declare locals/parameters as encountered,
//!    collecting pinning evidence along the way,
//! 3. link override / interface-implementation relation sets with a
//!    union-find so renaming decisions are per set, not per symbol.

use std::collections::{HashMap, HashSet};

use petgraph::unionfind::UnionFind;
use tracing::debug;

use super::symbol_table::{
    ROOT_SCOPE, ScopeId, ScopeKind, SymbolId, SymbolKind, SymbolTable, Visibility,
};
use crate::syntax::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

use CsSyntaxKind::*;

/// Resolve a parsed compilation unit into a symbol table.
pub fn resolve(cst: &CsSyntaxNode) -> SymbolTable {
    let mut resolver = Resolver::new();
    resolver.declare_phase(cst, ROOT_SCOPE);
    resolver.resolve_bases();
    resolver.bind_phase(cst, ROOT_SCOPE);
    resolver.pin_string_referenced(cst);
    resolver.apply_pins();
    resolver.link_relations();
    resolver.table
}

struct Resolver {
    table: SymbolTable,
    /// Type-decl node start offset → the scope holding its members.
    node_scopes: HashMap<u32, ScopeId>,
    /// Names that pin symbols of any kind (interpolation holes, nameof).
    pinned_all: HashSet<String>,
    /// Names that pin members and types (string literals, unresolvable
    /// member access, object initializers, attribute shorthand).
    pinned_members_types: HashSet<String>,
    /// Names that pin parameters (named arguments).
    pinned_params: HashSet<String>,
}

impl Resolver {
    fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            node_scopes: HashMap::new(),
            pinned_all: HashSet::new(),
            pinned_members_types: HashSet::new(),
            pinned_params: HashSet::new(),
        }
    }

    // === Shared helpers ===

    fn name_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
        node.children()
            .find(|c| c.kind() == Name)
            .and_then(|n| n.children_with_tokens().find_map(|e| e.into_token()))
    }

    fn name_tokens(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
        node.children()
            .filter(|c| c.kind() == Name)
            .filter_map(|n| n.children_with_tokens().find_map(|e| e.into_token()))
            .collect()
    }

    fn modifier_kinds(node: &CsSyntaxNode) -> Vec<CsSyntaxKind> {
        node.children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind().is_modifier())
            .map(|t| t.kind())
            .collect()
    }

    fn visibility_from(node: &CsSyntaxNode, default: Visibility) -> Visibility {
        let mods = Self::modifier_kinds(node);
        let private = mods.contains(&PrivateKw);
        let protected = mods.contains(&ProtectedKw);
        let internal = mods.contains(&InternalKw);
        let public = mods.contains(&PublicKw);
        match (public, protected, internal, private) {
            (true, ..) => Visibility::Public,
            (_, true, true, _) => Visibility::ProtectedInternal,
            (_, true, _, true) => Visibility::PrivateProtected,
            (_, true, _, _) => Visibility::Protected,
            (_, _, true, _) => Visibility::Internal,
            (_, _, _, true) => Visibility::Private,
            _ => default,
        }
    }

    fn has_attributes(node: &CsSyntaxNode) -> bool {
        node.children().any(|c| c.kind() == AttributeList)
    }

    fn offset_of(token: &CsSyntaxToken) -> u32 {
        u32::from(token.text_range().start())
    }

    /// Nearest enclosing type scope, for `this.`/`base.` qualified lookups.
    fn enclosing_type_scope(&self, mut scope: ScopeId) -> Option<ScopeId> {
        loop {
            if self.table.scopes[scope].kind == ScopeKind::Type {
                return Some(scope);
            }
            scope = self.table.scopes[scope].parent?;
        }
    }

    // === Phase 1: declarations ===

    fn declare_phase(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        match node.kind() {
            CompilationUnit => {
                for child in node.children() {
                    self.declare_phase(&child, scope);
                }
            }
            NamespaceDecl => {
                // Segment names become namespace symbols; never renamed,
                // but declared so references to them stay bound.
                if let Some(qualified) = node.children().find(|c| c.kind() == QualifiedName) {
                    for token in Self::name_tokens(&qualified) {
                        self.table.declare(
                            scope,
                            token.text(),
                            SymbolKind::Namespace,
                            Visibility::Public,
                            Self::offset_of(&token),
                        );
                    }
                }
                let ns_scope = self.table.push_scope(scope, ScopeKind::Namespace);
                self.node_scopes
                    .insert(u32::from(node.text_range().start()), ns_scope);
                for child in node.children() {
                    if matches!(child.kind(), TypeDecl | NamespaceDecl) {
                        self.declare_phase(&child, ns_scope);
                    }
                }
            }
            TypeDecl => self.declare_type(node, scope),
            _ => {}
        }
    }

    fn declare_type(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        let Some(name) = Self::name_token(node) else {
            return;
        };
        let nested = self.table.scopes[scope].kind == ScopeKind::Type;
        let default = if nested {
            Visibility::Private
        } else {
            Visibility::Internal
        };
        let vis = Self::visibility_from(node, default);
        let sym = self.table.declare(
            scope,
            name.text(),
            SymbolKind::Type,
            vis,
            Self::offset_of(&name),
        );
        self.table.symbols[sym].attributed |= Self::has_attributes(node);
        self.table.symbols[sym].is_interface |= node
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == InterfaceKw);

        // Partial declarations share one member scope.
        let type_scope = match self.table.symbols[sym].owned_scope {
            Some(existing) => existing,
            None => {
                let s = self.table.push_scope(scope, ScopeKind::Type);
                self.table.scopes[s].owner = Some(sym);
                self.table.symbols[sym].owned_scope = Some(s);
                s
            }
        };
        self.node_scopes
            .insert(u32::from(node.text_range().start()), type_scope);

        if let Some(base_list) = node.children().find(|c| c.kind() == BaseList) {
            let names = base_ref_names(&base_list);
            self.table.symbols[sym].base_names.extend(names);
        }

        if let Some(params) = node.children().find(|c| c.kind() == TypeParamList) {
            for tp in params.children().filter(|c| c.kind() == TypeParam) {
                if let Some(token) = Self::name_token(&tp) {
                    self.table.declare(
                        type_scope,
                        token.text(),
                        SymbolKind::TypeParam,
                        Visibility::Private,
                        Self::offset_of(&token),
                    );
                }
            }
        }

        for child in node.children() {
            match child.kind() {
                TypeDecl => self.declare_type(&child, type_scope),
                EnumMember => {
                    if let Some(token) = Self::name_token(&child) {
                        let id = self.table.declare(
                            type_scope,
                            token.text(),
                            SymbolKind::EnumMember,
                            vis,
                            Self::offset_of(&token),
                        );
                        self.table.symbols[id].attributed |= Self::has_attributes(&child);
                    }
                }
                FieldDecl | MethodDecl | PropertyDecl | EventDecl => {
                    self.declare_member(&child, type_scope);
                }
                _ => {}
            }
        }
    }

    fn declare_member(&mut self, node: &CsSyntaxNode, type_scope: ScopeId) {
        let kind = match node.kind() {
            FieldDecl => SymbolKind::Field,
            MethodDecl => SymbolKind::Method,
            PropertyDecl => SymbolKind::Property,
            EventDecl => SymbolKind::Event,
            _ => return,
        };
        let owner_is_interface = self.table.scopes[type_scope]
            .owner
            .map(|o| self.table.symbols[o].is_interface)
            .unwrap_or(false);
        let default = if owner_is_interface {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let vis = Self::visibility_from(node, default);
        let mods = Self::modifier_kinds(node);
        let attributed = Self::has_attributes(node);

        for token in Self::name_tokens(node) {
            let sym = self
                .table
                .declare(type_scope, token.text(), kind, vis, Self::offset_of(&token));
            let symbol = &mut self.table.symbols[sym];
            symbol.attributed |= attributed;
            symbol.is_override |= mods.contains(&OverrideKw);
            symbol.is_virtual |= mods.contains(&VirtualKw) || mods.contains(&AbstractKw);
        }
    }

    /// Resolve base-list names to in-source type scopes. A name that does
    /// not resolve stays unlinked; override members whose base lookup later
    /// fails are pinned instead of guessed at.
    fn resolve_bases(&mut self) {
        for sym_id in 0..self.table.symbols.len() {
            if self.table.symbols[sym_id].kind != SymbolKind::Type {
                continue;
            }
            let Some(my_scope) = self.table.symbols[sym_id].owned_scope else {
                continue;
            };
            let declared_in = self.table.symbols[sym_id].scope;
            let base_names = self.table.symbols[sym_id].base_names.clone();
            for name in base_names {
                let resolved = self.table.lookup(declared_in, &name).filter(|&b| {
                    self.table.symbols[b].kind == SymbolKind::Type
                        && self.table.symbols[b].owned_scope.is_some()
                });
                if let Some(base_sym) = resolved {
                    let base_scope = self.table.symbols[base_sym].owned_scope.unwrap();
                    self.table
                        .type_bases
                        .entry(my_scope)
                        .or_default()
                        .push(base_scope);
                    self.table
                        .type_derived
                        .entry(base_scope)
                        .or_default()
                        .push(my_scope);
                }
            }
        }
    }

    // === Phase 2: binding ===

    fn bind_phase(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        match node.kind() {
            CompilationUnit => {
                for child in node.children() {
                    self.bind_phase(&child, scope);
                }
            }
            NamespaceDecl => {
                let inner = self
                    .node_scopes
                    .get(&u32::from(node.text_range().start()))
                    .copied()
                    .unwrap_or(scope);
                for child in node.children() {
                    if child.kind() != QualifiedName {
                        self.bind_phase(&child, inner);
                    }
                }
            }
            TypeDecl => {
                let inner = self
                    .node_scopes
                    .get(&u32::from(node.text_range().start()))
                    .copied()
                    .unwrap_or(scope);
                for child in node.children() {
                    match child.kind() {
                        Name | TypeParamList => {}
                        AttributeList => self.bind_attribute_list(&child, scope),
                        // Base-list references bind where the type is
                        // declared, so internal base types rename cleanly.
                        BaseList => self.bind_name_refs_in(&child, scope),
                        _ => self.bind_phase(&child, inner),
                    }
                }
            }
            EnumMember => {
                for child in node.children() {
                    if child.kind() == Expr {
                        self.bind_expr(&child, scope);
                    }
                }
            }
            FieldDecl | EventDecl => {
                for child in node.children_with_tokens() {
                    match child {
                        rowan::NodeOrToken::Node(n) if n.kind() == NameRef => {
                            self.bind_name_ref(&n, scope)
                        }
                        rowan::NodeOrToken::Node(n) if n.kind() == Expr => {
                            self.bind_expr(&n, scope)
                        }
                        rowan::NodeOrToken::Node(n) if n.kind() == AccessorList => {
                            self.bind_accessors(&n, scope)
                        }
                        _ => {}
                    }
                }
            }
            MethodDecl => {
                self.pin_explicit_impl(node);
                let method_scope = self.table.push_scope(scope, ScopeKind::Method);
                for child in node.children() {
                    match child.kind() {
                        Name => {}
                        AttributeList => self.bind_attribute_list(&child, scope),
                        TypeParamList => {
                            for tp in child.children().filter(|c| c.kind() == TypeParam) {
                                if let Some(token) = Self::name_token(&tp) {
                                    self.table.declare(
                                        method_scope,
                                        token.text(),
                                        SymbolKind::TypeParam,
                                        Visibility::Private,
                                        Self::offset_of(&token),
                                    );
                                }
                            }
                        }
                        ParamList => self.bind_param_list(&child, method_scope),
                        NameRef => self.bind_name_ref(&child, method_scope),
                        Block => self.bind_block(&child, method_scope),
                        Expr => self.bind_expr(&child, method_scope),
                        _ => self.bind_phase(&child, method_scope),
                    }
                }
            }
            PropertyDecl => {
                self.pin_explicit_impl(node);
                let prop_scope = self.table.push_scope(scope, ScopeKind::Method);
                for child in node.children() {
                    match child.kind() {
                        Name => {}
                        AttributeList => self.bind_attribute_list(&child, scope),
                        ParamList => self.bind_param_list(&child, prop_scope),
                        NameRef => self.bind_name_ref(&child, prop_scope),
                        AccessorList => self.bind_accessors(&child, prop_scope),
                        Expr => self.bind_expr(&child, prop_scope),
                        _ => {}
                    }
                }
            }
            Block => self.bind_block(node, scope),
            LocalDeclStmt => self.bind_local_decl(node, scope),
            ForStmt | ForeachStmt | UsingStmt | SwitchStmt => {
                let header_scope = self.table.push_scope(scope, ScopeKind::Block);
                if node.kind() == ForeachStmt {
                    if let Some(token) = Self::name_token(node) {
                        self.table.declare(
                            header_scope,
                            token.text(),
                            SymbolKind::Local,
                            Visibility::Private,
                            Self::offset_of(&token),
                        );
                    }
                }
                for child in node.children() {
                    if child.kind() != Name {
                        self.bind_phase(&child, header_scope);
                    }
                }
            }
            CatchClause => {
                let catch_scope = self.table.push_scope(scope, ScopeKind::Block);
                if let Some(token) = Self::name_token(node) {
                    self.table.declare(
                        catch_scope,
                        token.text(),
                        SymbolKind::Local,
                        Visibility::Private,
                        Self::offset_of(&token),
                    );
                }
                for child in node.children() {
                    if child.kind() != Name {
                        self.bind_phase(&child, catch_scope);
                    }
                }
            }
            Expr => self.bind_expr(node, scope),
            NameRef => self.bind_name_ref(node, scope),
            UsingDirective => self.bind_name_refs_in(node, scope),
            AttributeList => self.bind_attribute_list(node, scope),
            _ => {
                for child in node.children() {
                    self.bind_phase(&child, scope);
                }
            }
        }
    }

    fn bind_block(&mut self, node: &CsSyntaxNode, parent: ScopeId) {
        let scope = self.table.push_scope(parent, ScopeKind::Block);
        for child in node.children() {
            self.bind_phase(&child, scope);
        }
    }

    fn bind_accessors(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        for child in node.children() {
            match child.kind() {
                Block => self.bind_block(&child, scope),
                Expr => self.bind_expr(&child, scope),
                AttributeList => self.bind_attribute_list(&child, scope),
                _ => {}
            }
        }
    }

    fn bind_param_list(&mut self, node: &CsSyntaxNode, method_scope: ScopeId) {
        for param in node.children().filter(|c| c.kind() == Param) {
            for child in param.children() {
                match child.kind() {
                    Name => {
                        if let Some(token) = child
                            .children_with_tokens()
                            .find_map(|e| e.into_token())
                        {
                            self.table.declare(
                                method_scope,
                                token.text(),
                                SymbolKind::Param,
                                Visibility::Private,
                                Self::offset_of(&token),
                            );
                        }
                    }
                    NameRef => self.bind_name_ref(&child, method_scope),
                    Expr => self.bind_expr(&child, method_scope),
                    AttributeList => self.bind_attribute_list(&child, method_scope),
                    _ => {}
                }
            }
        }
    }

    fn bind_local_decl(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        for child in node.children() {
            match child.kind() {
                NameRef => self.bind_name_ref(&child, scope),
                Expr => self.bind_expr(&child, scope),
                Name => {
                    if let Some(token) =
                        child.children_with_tokens().find_map(|e| e.into_token())
                    {
                        self.table.declare(
                            scope,
                            token.text(),
                            SymbolKind::Local,
                            Visibility::Private,
                            Self::offset_of(&token),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// An explicitly-implemented member (`void IFace.M()`) keeps its final
    /// segment as a bare identifier in the tree. The interface member it is
    /// bound to can then never rename without breaking the implementation,
    /// so the name is pinned for member symbols.
    fn pin_explicit_impl(&mut self, node: &CsSyntaxNode) {
        if node.children().any(|c| c.kind() == Name) {
            return;
        }
        for element in node.children_with_tokens() {
            if let Some(token) = element.as_token() {
                if token.kind() == Ident {
                    debug!(name = token.text(), "pinned as explicit interface implementation");
                    self.pinned_members_types.insert(token.text().to_string());
                }
            }
        }
    }

    /// Bind every NameRef anywhere under `node` (using directives, base
    /// lists), qualification-aware.
    fn bind_name_refs_in(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        for desc in node.descendants() {
            if desc.kind() == NameRef {
                self.bind_name_ref(&desc, scope);
            }
        }
    }

    /// Attribute usage allows dropping the `Attribute` suffix, so the
    /// shorthand also pins `<name>Attribute` types.
    fn bind_attribute_list(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        for desc in node.descendants() {
            if desc.kind() == NameRef {
                if let Some(token) = desc.children_with_tokens().find_map(|e| e.into_token()) {
                    self.pinned_members_types
                        .insert(format!("{}Attribute", token.text()));
                }
                self.bind_name_ref(&desc, scope);
            }
        }
    }

    /// Bind a single NameRef node outside expression context.
    fn bind_name_ref(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        let Some(token) = node.children_with_tokens().find_map(|e| e.into_token()) else {
            return;
        };
        let name = token.text().to_string();
        let prev = prev_significant_token(node);
        if let Some(prev) = &prev {
            if matches!(prev.kind(), Dot | QuestionDot | ColonColon) {
                let qualifier = prev_significant_before(prev);
                match qualifier.map(|q| q.kind()) {
                    Some(ThisKw) | Some(BaseKw) => {
                        if let Some(type_scope) = self.enclosing_type_scope(scope) {
                            self.bind_or_unresolved(&name, type_scope, &token);
                        }
                        return;
                    }
                    _ => {
                        // Unknown receiver: never guess, keep the name safe.
                        self.pinned_members_types.insert(name);
                        return;
                    }
                }
            }
        }
        self.bind_or_unresolved(&name, scope, &token);
    }

    fn bind_or_unresolved(&mut self, name: &str, scope: ScopeId, token: &CsSyntaxToken) {
        match self.table.lookup(scope, name) {
            Some(sym) => self.table.record_ref(sym, Self::offset_of(token)),
            None => {
                self.table.unresolved.insert(name.to_string());
            }
        }
    }

    /// Bind the token run of an expression, tracking just enough context to
    /// stay safe: member access receivers, `nameof`, named arguments, and
    /// object-initializer assignments.
    fn bind_expr(&mut self, node: &CsSyntaxNode, scope: ScopeId) {
        enum Piece {
            Tok(CsSyntaxKind),
            Ref(String, u32),
        }

        let pieces: Vec<Piece> = node
            .children_with_tokens()
            .filter_map(|element| match element {
                rowan::NodeOrToken::Token(t) => {
                    if t.kind().is_trivia() {
                        None
                    } else {
                        Some(Piece::Tok(t.kind()))
                    }
                }
                rowan::NodeOrToken::Node(n) if n.kind() == NameRef => {
                    let token = n.children_with_tokens().find_map(|e| e.into_token())?;
                    Some(Piece::Ref(
                        token.text().to_string(),
                        u32::from(token.text_range().start()),
                    ))
                }
                rowan::NodeOrToken::Node(_) => None,
            })
            .collect();

        let mut paren_depth = 0usize;
        let mut brace_depth = 0usize;
        let mut nameof_at: Option<usize> = None;

        for i in 0..pieces.len() {
            match &pieces[i] {
                Piece::Tok(kind) => match kind {
                    LParen => paren_depth += 1,
                    RParen => {
                        paren_depth = paren_depth.saturating_sub(1);
                        if let Some(at) = nameof_at {
                            if paren_depth <= at {
                                nameof_at = None;
                            }
                        }
                    }
                    LBrace => brace_depth += 1,
                    RBrace => brace_depth = brace_depth.saturating_sub(1),
                    _ => {}
                },
                Piece::Ref(name, offset) => {
                    let prev = if i > 0 {
                        match &pieces[i - 1] {
                            Piece::Tok(k) => Some(*k),
                            Piece::Ref(..) => Some(Ident),
                        }
                    } else {
                        None
                    };
                    let prev2 = if i > 1 {
                        match &pieces[i - 2] {
                            Piece::Tok(k) => Some(*k),
                            Piece::Ref(..) => Some(Ident),
                        }
                    } else {
                        None
                    };
                    let next = match pieces.get(i + 1) {
                        Some(Piece::Tok(k)) => Some(*k),
                        Some(Piece::Ref(..)) => Some(Ident),
                        None => None,
                    };

                    // Inside nameof(...): the identifier becomes a string
                    // at compile time; renaming would change program output.
                    if nameof_at.is_some() {
                        debug!(name = %name, "pinned by nameof");
                        self.pinned_all.insert(name.clone());
                        continue;
                    }
                    if name == "nameof" && next == Some(LParen) {
                        nameof_at = Some(paren_depth);
                        continue;
                    }

                    // Qualified by an unknown receiver
                    if matches!(prev, Some(Dot) | Some(QuestionDot) | Some(ColonColon)) {
                        if matches!(prev2, Some(ThisKw) | Some(BaseKw)) {
                            if let Some(type_scope) = self.enclosing_type_scope(scope) {
                                match self.table.lookup(type_scope, name) {
                                    Some(sym) => self.table.record_ref(sym, *offset),
                                    None => {
                                        self.table.unresolved.insert(name.clone());
                                    }
                                }
                            }
                        } else {
                            self.pinned_members_types.insert(name.clone());
                        }
                        continue;
                    }

                    // Named argument label: `M(count: 1)`
                    if next == Some(Colon)
                        && paren_depth > 0
                        && matches!(prev, Some(LParen) | Some(Comma))
                    {
                        debug!(name = %name, "pinned as named-argument label");
                        self.pinned_params.insert(name.clone());
                        continue;
                    }

                    // Object-initializer member: `new T { Name = ... }`
                    if next == Some(Eq)
                        && brace_depth > 0
                        && matches!(prev, Some(LBrace) | Some(Comma))
                    {
                        debug!(name = %name, "pinned as object-initializer member");
                        self.pinned_members_types.insert(name.clone());
                        continue;
                    }

                    match self.table.lookup(scope, name) {
                        Some(sym) => self.table.record_ref(sym, *offset),
                        None => {
                            self.table.unresolved.insert(name.clone());
                        }
                    }
                }
            }
        }
    }

    // === Pinning ===

    /// Names mentioned in string literals may be reflection or
    /// serialization keys; names in interpolation holes are code.
    fn pin_string_referenced(&mut self, cst: &CsSyntaxNode) {
        for element in cst.descendants_with_tokens() {
            let Some(token) = element.as_token() else {
                continue;
            };
            match token.kind() {
                StringLiteral | VerbatimString => {
                    for word in ident_words(token.text()) {
                        self.pinned_members_types.insert(word);
                    }
                }
                InterpolatedString => {
                    for word in ident_words(token.text()) {
                        self.pinned_all.insert(word);
                    }
                }
                _ => {}
            }
        }
    }

    fn apply_pins(&mut self) {
        for symbol in &mut self.table.symbols {
            let by_name = self.pinned_all.contains(&symbol.name)
                || ((symbol.kind.is_member() || symbol.kind.is_type_like())
                    && self.pinned_members_types.contains(&symbol.name))
                || (symbol.kind == SymbolKind::Param && self.pinned_params.contains(&symbol.name));
            if by_name {
                symbol.pinned = true;
            }
        }
    }

    // === Phase 3: relation sets ===

    fn link_relations(&mut self) {
        let count = self.table.symbols.len();
        let mut uf = UnionFind::<usize>::new(count);

        for sym_id in 0..count {
            if self.table.symbols[sym_id].kind != SymbolKind::Type {
                continue;
            }
            let Some(scope) = self.table.symbols[sym_id].owned_scope else {
                continue;
            };

            // Override chains: an override must rename with what it
            // overrides; an override of something outside this source can
            // never be renamed.
            let members: Vec<(String, SymbolId)> = self.table.scopes[scope]
                .names
                .iter()
                .map(|(n, &s)| (n.clone(), s))
                .collect();
            for (name, member) in &members {
                if !self.table.symbols[*member].is_override {
                    continue;
                }
                let mut found = None;
                for base in self.table.base_closure(scope) {
                    if let Some(&base_member) = self.table.scopes[base].names.get(name) {
                        found = Some(base_member);
                        break;
                    }
                }
                match found {
                    Some(base_member) => {
                        uf.union(*member, base_member);
                    }
                    None => {
                        debug!(name = %name, "override with external base pinned");
                        self.table.symbols[*member].pinned = true;
                    }
                }
            }

            // Implicit and explicit interface implementations: members of an
            // implemented in-source interface rename together with their
            // implementations.
            for base in self.table.base_closure(scope) {
                let base_is_interface = self.table.scopes[base]
                    .owner
                    .map(|o| self.table.symbols[o].is_interface)
                    .unwrap_or(false);
                if !base_is_interface {
                    continue;
                }
                let iface_members: Vec<(String, SymbolId)> = self.table.scopes[base]
                    .names
                    .iter()
                    .map(|(n, &s)| (n.clone(), s))
                    .collect();
                for (name, iface_member) in iface_members {
                    if !self.table.symbols[iface_member].kind.is_member() {
                        continue;
                    }
                    if let Some(&mine) = self.table.scopes[scope].names.get(&name) {
                        if self.table.symbols[mine].kind.is_member() {
                            uf.union(iface_member, mine);
                        }
                    }
                }
            }
        }

        self.table.relation_root = (0..count).map(|s| uf.find(s)).collect();
    }
}

/// Names referenced at angle-depth zero in a base list; generic arguments
/// are not base types.
fn base_ref_names(base_list: &CsSyntaxNode) -> Vec<String> {
    let mut names = Vec::new();
    let mut angle_depth = 0usize;
    for element in base_list.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Token(t) => match t.kind() {
                Lt => angle_depth += 1,
                Gt => angle_depth = angle_depth.saturating_sub(1),
                _ => {}
            },
            rowan::NodeOrToken::Node(n) if n.kind() == NameRef && angle_depth == 0 => {
                if let Some(token) = n.children_with_tokens().find_map(|e| e.into_token()) {
                    names.push(token.text().to_string());
                }
            }
            _ => {}
        }
    }
    names
}

/// Previous non-trivia sibling token of a node.
fn prev_significant_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    let mut current = node.prev_sibling_or_token();
    while let Some(element) = current {
        match &element {
            rowan::NodeOrToken::Token(t) if !t.kind().is_trivia() => return Some(t.clone()),
            rowan::NodeOrToken::Node(_) => return None,
            _ => {}
        }
        current = element.prev_sibling_or_token();
    }
    None
}

/// Previous non-trivia sibling element before a token, as a token when it
/// is one (or the last token of a node when it is a node).
fn prev_significant_before(token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let mut current = token.prev_sibling_or_token();
    while let Some(element) = current {
        match &element {
            rowan::NodeOrToken::Token(t) if !t.kind().is_trivia() => return Some(t.clone()),
            rowan::NodeOrToken::Node(n) => {
                return n
                    .children_with_tokens()
                    .filter_map(|e| e.into_token())
                    .filter(|t| !t.kind().is_trivia())
                    .last();
            }
            _ => {}
        }
        current = element.prev_sibling_or_token();
    }
    None
}

/// Identifier-shaped words inside a literal's text.
fn ident_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c == '_' || c.is_alphanumeric() {
            current.push(c);
        } else if !current.is_empty() {
            if current.chars().next().is_some_and(|f| f == '_' || f.is_alphabetic()) {
                words.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if !current.is_empty() && current.chars().next().is_some_and(|f| f == '_' || f.is_alphabetic())
    {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn table_for(source: &str) -> SymbolTable {
        let (cst, lex_errors, parse_errors) = parse(source);
        assert!(lex_errors.is_empty(), "{lex_errors:?}");
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        resolve(&cst)
    }

    fn symbol<'t>(table: &'t SymbolTable, name: &str) -> &'t crate::semantic::Symbol {
        table
            .symbols
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("symbol {name} not found"))
    }

    #[test]
    fn test_local_references_bind_to_declaration() {
        let table = table_for(
            "class C { void M() { int count = 0; count = count + 1; } }",
        );
        let local = symbol(&table, "count");
        assert_eq!(local.kind, SymbolKind::Local);
        assert_eq!(local.decls.len(), 1);
        assert_eq!(local.refs.len(), 2);
    }

    #[test]
    fn test_shadowing_innermost_wins() {
        let table = table_for(
            "class C { int x; void M() { int x = 1; x = 2; } }",
        );
        let locals: Vec<_> = table
            .symbols
            .iter()
            .filter(|s| s.name == "x")
            .collect();
        assert_eq!(locals.len(), 2);
        let local = locals.iter().find(|s| s.kind == SymbolKind::Local).unwrap();
        let field = locals.iter().find(|s| s.kind == SymbolKind::Field).unwrap();
        assert_eq!(local.refs.len(), 1);
        assert_eq!(field.refs.len(), 0);
    }

    #[test]
    fn test_this_qualified_binds_to_member() {
        let table = table_for(
            "class C { int total; void M(int total) { this.total = total; } }",
        );
        let field = table
            .symbols
            .iter()
            .find(|s| s.name == "total" && s.kind == SymbolKind::Field)
            .unwrap();
        let param = table
            .symbols
            .iter()
            .find(|s| s.name == "total" && s.kind == SymbolKind::Param)
            .unwrap();
        assert_eq!(field.refs.len(), 1);
        assert_eq!(param.refs.len(), 1);
    }

    #[test]
    fn test_unknown_receiver_pins_member() {
        let table = table_for(
            "class C { int size; void M(C other) { other.size = 1; } }",
        );
        assert!(symbol(&table, "size").pinned);
    }

    #[test]
    fn test_member_visibility_defaults() {
        let table = table_for(
            "class C { int a; public int b; protected int c; internal int d; }",
        );
        assert_eq!(symbol(&table, "a").visibility, Visibility::Private);
        assert_eq!(symbol(&table, "b").visibility, Visibility::Public);
        assert_eq!(symbol(&table, "c").visibility, Visibility::Protected);
        assert_eq!(symbol(&table, "d").visibility, Visibility::Internal);
    }

    #[test]
    fn test_top_level_type_defaults_internal() {
        let table = table_for("class C { } public class D { }");
        assert_eq!(symbol(&table, "C").visibility, Visibility::Internal);
        assert_eq!(symbol(&table, "D").visibility, Visibility::Public);
    }

    #[test]
    fn test_unresolved_reference_is_not_an_error() {
        let table = table_for("class C { void M() { Console.WriteLine(1); } }");
        assert!(table.unresolved.contains("Console"));
        // WriteLine is dot-qualified by an unknown receiver
        assert!(!table.unresolved.contains("WriteLine"));
    }

    #[test]
    fn test_nameof_pins_symbol() {
        let table = table_for(
            "class C { int hits; string M() { return nameof(hits); } }",
        );
        assert!(symbol(&table, "hits").pinned);
    }

    #[test]
    fn test_interpolation_hole_pins_local() {
        let table = table_for(
            r#"class C { string M() { int speed = 3; return $"{speed}"; } }"#,
        );
        assert!(symbol(&table, "speed").pinned);
    }

    #[test]
    fn test_string_literal_pins_member_but_not_local() {
        let table = table_for(
            r#"class C { int width; void M() { int height = 2; Use("width height"); } void Use(string s) { } }"#,
        );
        assert!(symbol(&table, "width").pinned);
        let height = table
            .symbols
            .iter()
            .find(|s| s.name == "height")
            .unwrap();
        assert!(!height.pinned);
    }

    #[test]
    fn test_attributed_member_flagged() {
        let table = table_for("class C { [Obsolete] int legacy; int fresh; }");
        assert!(symbol(&table, "legacy").attributed);
        assert!(!symbol(&table, "fresh").attributed);
    }

    #[test]
    fn test_override_of_source_base_links_relation() {
        let table = table_for(
            "class B { protected virtual void Run() { } } class D : B { protected override void Run() { } }",
        );
        let ids: Vec<usize> = table
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == "Run")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(table.relation_root[ids[0]], table.relation_root[ids[1]]);
    }

    #[test]
    fn test_override_of_external_base_is_pinned() {
        let table = table_for(
            "class D : ExternalBase { public override string ToText() { return null; } }",
        );
        assert!(symbol(&table, "ToText").pinned);
    }

    #[test]
    fn test_interface_implementation_links_relation() {
        let table = table_for(
            "interface IRun { void Go(); } class R : IRun { public void Go() { } }",
        );
        let ids: Vec<usize> = table
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == "Go")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(table.relation_root[ids[0]], table.relation_root[ids[1]]);
    }

    #[test]
    fn test_named_argument_pins_parameter() {
        let table = table_for(
            "class C { void Use(int count) { Use(count: 1); } }",
        );
        assert!(symbol(&table, "count").pinned);
    }

    #[test]
    fn test_partial_types_share_one_symbol() {
        let table = table_for("partial class P { int a; } partial class P { int b; }");
        let types: Vec<_> = table
            .symbols
            .iter()
            .filter(|s| s.name == "P" && s.kind == SymbolKind::Type)
            .collect();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].decls.len(), 2);
        // Both halves share the member scope
        let scope = types[0].owned_scope.unwrap();
        assert!(table.scopes[scope].names.contains_key("a"));
        assert!(table.scopes[scope].names.contains_key("b"));
    }
}
