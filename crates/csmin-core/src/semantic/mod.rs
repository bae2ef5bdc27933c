//! Symbol classification for safe renaming
//!
//! A lightweight binder over the lossless CST: declarations and references
//! are matched by lexical scoping only, visibility comes from explicit
//! modifiers or context defaults, and everything the binder cannot prove is
//! treated as not renameable.

mod resolver;
mod symbol_table;

pub use resolver::resolve;
pub use symbol_table::{
    ROOT_SCOPE, Scope, ScopeId, ScopeKind, Symbol, SymbolId, SymbolKind, SymbolTable, Visibility,
};
