//! Scope and symbol bookkeeping for the resolver
//!
//! One arena of scopes (root ⊃ namespace ⊃ type ⊃ method ⊃ block) and one
//! arena of symbols. Scope name maps are insertion-ordered so that every
//! downstream traversal — and therefore short-name assignment — is
//! reproducible across runs on identical input.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

pub type SymbolId = usize;
pub type ScopeId = usize;

/// What a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Namespace,
    Type,
    TypeParam,
    Field,
    Property,
    Method,
    Event,
    EnumMember,
    Param,
    Local,
}

impl SymbolKind {
    /// Member symbols governed by the members-compressing toggle.
    pub fn is_member(self) -> bool {
        matches!(
            self,
            SymbolKind::Field
                | SymbolKind::Property
                | SymbolKind::Method
                | SymbolKind::Event
                | SymbolKind::EnumMember
        )
    }

    /// Locals and parameters governed by the local-vars toggle.
    pub fn is_local_like(self) -> bool {
        matches!(self, SymbolKind::Local | SymbolKind::Param)
    }

    /// Type-level symbols governed by the types-compressing toggle.
    pub fn is_type_like(self) -> bool {
        matches!(self, SymbolKind::Type | SymbolKind::TypeParam)
    }
}

/// Effective accessibility of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    Private,
    /// `private protected` — derived types within the same assembly
    PrivateProtected,
    Internal,
    /// `protected internal`
    ProtectedInternal,
    Protected,
    Public,
}

impl Visibility {
    /// Observable from outside the compiled assembly: renaming such a
    /// symbol can break external consumers.
    pub fn is_externally_observable(self) -> bool {
        matches!(
            self,
            Visibility::Public | Visibility::Protected | Visibility::ProtectedInternal
        )
    }

    /// The wider of two accessibilities; used when partial declarations or
    /// overloads of one name disagree.
    pub fn widest(self, other: Visibility) -> Visibility {
        self.max(other)
    }
}

/// Kinds of scope in the nesting hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Namespace,
    Type,
    Method,
    Block,
}

/// A region of the program within which declared names are visible.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Declared names, in declaration order.
    pub names: IndexMap<String, SymbolId>,
    pub children: Vec<ScopeId>,
    /// The symbol this scope belongs to (the type for a type scope, ...).
    pub owner: Option<SymbolId>,
}

/// A declared entity and everything known about it.
#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    /// Scope the name is introduced into.
    pub scope: ScopeId,
    /// Token offsets of the declaring identifiers (several for partial
    /// types, overloads, or multi-declarator fields).
    pub decls: Vec<u32>,
    /// Token offsets of every bound reference.
    pub refs: Vec<u32>,
    /// Excluded from renaming by a safety heuristic.
    pub pinned: bool,
    /// Carries an attribute list (serialization-sensitive by default).
    pub attributed: bool,
    /// Declared with `override`.
    pub is_override: bool,
    /// Declared with `virtual` or `abstract`.
    pub is_virtual: bool,
    /// For types: the scope holding members; for methods: the scope
    /// holding parameters.
    pub owned_scope: Option<ScopeId>,
    /// For types: `interface` declarations implement-relate their members.
    pub is_interface: bool,
    /// For types: raw base-list names, resolved after declaration.
    pub base_names: Vec<String>,
}

/// The resolver's output: scopes, symbols, inheritance links, and the
/// names that could not be bound (and therefore must stay available).
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub scopes: Vec<Scope>,
    pub symbols: Vec<Symbol>,
    /// Names referenced but never bound to a declaration in this source.
    pub unresolved: HashSet<String>,
    /// Direct base type scopes per type scope.
    pub type_bases: HashMap<ScopeId, Vec<ScopeId>>,
    /// Direct derived type scopes per type scope.
    pub type_derived: HashMap<ScopeId, Vec<ScopeId>>,
    /// Union-find root per symbol: members that must rename together.
    pub relation_root: Vec<SymbolId>,
}

pub const ROOT_SCOPE: ScopeId = 0;

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = Self::default();
        table.scopes.push(Scope {
            parent: None,
            kind: ScopeKind::Root,
            names: IndexMap::new(),
            children: Vec::new(),
            owner: None,
        });
        table
    }

    pub fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            parent: Some(parent),
            kind,
            names: IndexMap::new(),
            children: Vec::new(),
            owner: None,
        });
        self.scopes[parent].children.push(id);
        id
    }

    /// Introduce `name` into `scope`, merging with an existing symbol of
    /// the same name there (overloads, partial declarations, multiple
    /// declarators). Returns the symbol id.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        visibility: Visibility,
        offset: u32,
    ) -> SymbolId {
        if let Some(&existing) = self.scopes[scope].names.get(name) {
            let sym = &mut self.symbols[existing];
            sym.decls.push(offset);
            sym.visibility = sym.visibility.widest(visibility);
            return existing;
        }
        let id = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            visibility,
            scope,
            decls: vec![offset],
            refs: Vec::new(),
            pinned: false,
            attributed: false,
            is_override: false,
            is_virtual: false,
            owned_scope: None,
            is_interface: false,
            base_names: Vec::new(),
        });
        self.scopes[scope].names.insert(name.to_string(), id);
        id
    }

    /// Lexical lookup: innermost declaring scope wins. Type scopes also
    /// see inherited members from base types declared in this source.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<SymbolId> {
        let mut scope = Some(from);
        while let Some(id) = scope {
            if let Some(&sym) = self.scopes[id].names.get(name) {
                return Some(sym);
            }
            if self.scopes[id].kind == ScopeKind::Type {
                if let Some(sym) = self.lookup_in_bases(id, name, 0) {
                    return Some(sym);
                }
            }
            scope = self.scopes[id].parent;
        }
        None
    }

    fn lookup_in_bases(&self, type_scope: ScopeId, name: &str, depth: usize) -> Option<SymbolId> {
        if depth > 32 {
            return None; // inheritance cycle in malformed input
        }
        let bases = self.type_bases.get(&type_scope)?;
        for &base in bases {
            if let Some(&sym) = self.scopes[base].names.get(name) {
                return Some(sym);
            }
            if let Some(sym) = self.lookup_in_bases(base, name, depth + 1) {
                return Some(sym);
            }
        }
        None
    }

    pub fn record_ref(&mut self, symbol: SymbolId, offset: u32) {
        self.symbols[symbol].refs.push(offset);
    }

    /// All base type scopes reachable from `type_scope`.
    pub fn base_closure(&self, type_scope: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut work = vec![type_scope];
        let mut seen = HashSet::new();
        while let Some(s) = work.pop() {
            if let Some(bases) = self.type_bases.get(&s) {
                for &b in bases {
                    if seen.insert(b) {
                        out.push(b);
                        work.push(b);
                    }
                }
            }
        }
        out
    }

    /// All derived type scopes reachable from `type_scope`.
    pub fn derived_closure(&self, type_scope: ScopeId) -> Vec<ScopeId> {
        let mut out = Vec::new();
        let mut work = vec![type_scope];
        let mut seen = HashSet::new();
        while let Some(s) = work.pop() {
            if let Some(derived) = self.type_derived.get(&s) {
                for &d in derived {
                    if seen.insert(d) {
                        out.push(d);
                        work.push(d);
                    }
                }
            }
        }
        out
    }

    /// All scopes in the subtree rooted at `scope`, including itself.
    pub fn scope_subtree(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut out = vec![scope];
        let mut i = 0;
        while i < out.len() {
            let s = out[i];
            out.extend(self.scopes[s].children.iter().copied());
            i += 1;
        }
        out
    }

    /// Members of the relation set `root`, in symbol-id order.
    pub fn relation_set(&self, root: SymbolId) -> Vec<SymbolId> {
        (0..self.symbols.len())
            .filter(|&s| self.relation_root.get(s).copied() == Some(root))
            .collect()
    }
}
