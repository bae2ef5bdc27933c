//! Identifier compressor
//!
//! Assigns each rename-eligible symbol the shortest unused name and applies
//! it to the declaration and every bound reference. Assignment is
//! deterministic: symbols are processed in declaration order, candidates
//! come from a fixed alphabet (`a`..`z`, `aa`..`zz`, ...), and scope maps
//! preserve insertion order — identical input always yields identical
//! output.
//!
//! A candidate is rejected while it collides with anything visible in the
//! declaring scope chain (inherited members included), anything declared in
//! the scope's subtree (or a derived type's subtree, for members), any name
//! the source references but never declares, or any ignore-listed
//! identifier. Symbols whose toggle is off keep their names and still
//! occupy them for collision accounting. The alphabet never runs out; it
//! just grows another letter.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::ignore::IgnoreFilter;
use crate::options::MinifierOptions;
use crate::semantic::{ScopeId, ScopeKind, SymbolId, SymbolKind, SymbolTable};
use crate::syntax::CsSyntaxKind;

/// Deterministic short-name source: bijective base-26 over `a`..`z`.
pub struct NameGenerator;

impl NameGenerator {
    pub fn name_at(index: usize) -> String {
        let mut i = index;
        let mut bytes = Vec::new();
        loop {
            bytes.push(b'a' + (i % 26) as u8);
            i /= 26;
            if i == 0 {
                break;
            }
            i -= 1;
        }
        bytes.reverse();
        String::from_utf8(bytes).expect("generated names are ASCII")
    }
}

/// Compute the rename map: token offset → replacement text.
pub fn compress_identifiers(
    table: &SymbolTable,
    options: &MinifierOptions,
    ignore: &IgnoreFilter,
) -> HashMap<u32, String> {
    // Group symbols into their relation sets; renaming is per set.
    let mut sets: IndexMap<SymbolId, Vec<SymbolId>> = IndexMap::new();
    for id in 0..table.symbols.len() {
        let root = table.relation_root.get(id).copied().unwrap_or(id);
        sets.entry(root).or_default().push(id);
    }

    // Mutable mirror of every scope's declared names, updated as renames
    // are decided so later assignments see earlier ones.
    let mut names: Vec<IndexMap<String, SymbolId>> =
        table.scopes.iter().map(|s| s.names.clone()).collect();

    let mut renames: HashMap<u32, String> = HashMap::new();
    let mut processed: HashSet<SymbolId> = HashSet::new();

    for id in 0..table.symbols.len() {
        if processed.contains(&id) {
            continue;
        }
        let root = table.relation_root.get(id).copied().unwrap_or(id);
        let set = sets.get(&root).cloned().unwrap_or_else(|| vec![id]);
        for &member in &set {
            processed.insert(member);
        }

        // One ineligible member poisons the whole relation set.
        if !set.iter().all(|&m| eligible(table, m, options, ignore)) {
            continue;
        }

        let mut index = 0usize;
        let new_name = loop {
            let candidate = NameGenerator::name_at(index);
            index += 1;
            if CsSyntaxKind::is_reserved_word(&candidate) {
                continue;
            }
            if table.unresolved.contains(&candidate) {
                continue;
            }
            if ignore.reserves_name(&candidate) {
                continue;
            }
            if set
                .iter()
                .any(|&m| conflicts(table, &names, &set, m, &candidate))
            {
                continue;
            }
            break candidate;
        };

        for &member in &set {
            let symbol = &table.symbols[member];
            debug!(from = %symbol.name, to = %new_name, "renaming symbol");
            let scope_map = &mut names[symbol.scope];
            scope_map.shift_remove(&symbol.name);
            scope_map.insert(new_name.clone(), member);
            for &offset in symbol.decls.iter().chain(symbol.refs.iter()) {
                renames.insert(offset, new_name.clone());
            }
        }
    }

    renames
}

fn eligible(
    table: &SymbolTable,
    id: SymbolId,
    options: &MinifierOptions,
    ignore: &IgnoreFilter,
) -> bool {
    let symbol = &table.symbols[id];
    if symbol.pinned || ignore.keeps_identifier(&symbol.name) {
        return false;
    }
    match symbol.kind {
        SymbolKind::Local | SymbolKind::Param => options.local_vars_compressing,
        k if k.is_member() => {
            options.members_compressing
                && !symbol.visibility.is_externally_observable()
                && !symbol.attributed
        }
        SymbolKind::Type => {
            options.types_compressing
                && !symbol.visibility.is_externally_observable()
                && !symbol.attributed
        }
        SymbolKind::TypeParam => options.types_compressing && !symbol.attributed,
        _ => false,
    }
}

/// Would giving `candidate` to `member` collide with a simultaneously
/// visible name?
fn conflicts(
    table: &SymbolTable,
    names: &[IndexMap<String, SymbolId>],
    set: &[SymbolId],
    member: SymbolId,
    candidate: &str,
) -> bool {
    let symbol = &table.symbols[member];

    // Upward: everything visible where the symbol is declared.
    let mut scope = Some(symbol.scope);
    while let Some(s) = scope {
        if clash(names, s, set, candidate) {
            return true;
        }
        if table.scopes[s].kind == ScopeKind::Type {
            for base in table.base_closure(s) {
                if clash(names, base, set, candidate) {
                    return true;
                }
            }
        }
        scope = table.scopes[s].parent;
    }

    // Downward: anything declared inside the symbol's visibility region
    // would either shadow the new name or be captured by it. For members,
    // the region extends into every derived type.
    let mut subtree: Vec<ScopeId> = table.scope_subtree(symbol.scope);
    if table.scopes[symbol.scope].kind == ScopeKind::Type {
        for derived in table.derived_closure(symbol.scope) {
            subtree.extend(table.scope_subtree(derived));
        }
    }
    for s in subtree {
        if clash(names, s, set, candidate) {
            return true;
        }
    }

    false
}

fn clash(
    names: &[IndexMap<String, SymbolId>],
    scope: ScopeId,
    set: &[SymbolId],
    candidate: &str,
) -> bool {
    names[scope]
        .get(candidate)
        .is_some_and(|sid| !set.contains(sid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::resolve;
    use crate::syntax::parse;

    fn rename_map(source: &str, options: &MinifierOptions) -> HashMap<u32, String> {
        let (cst, lex_errors, parse_errors) = parse(source);
        assert!(lex_errors.is_empty());
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        let table = resolve(&cst);
        compress_identifiers(&table, options, &IgnoreFilter::default())
    }

    fn apply(source: &str, options: &MinifierOptions) -> String {
        let renames = rename_map(source, options);
        let (tokens, _) = crate::syntax::lex_with_trivia(source);
        let mut stream = crate::syntax::TokenStream::from_lexed(&tokens);
        for token in &mut stream.tokens {
            if let Some(new_text) = renames.get(&token.offset) {
                token.text = new_text.clone();
            }
        }
        stream.text()
    }

    #[test]
    fn test_name_generator_sequence() {
        assert_eq!(NameGenerator::name_at(0), "a");
        assert_eq!(NameGenerator::name_at(25), "z");
        assert_eq!(NameGenerator::name_at(26), "aa");
        assert_eq!(NameGenerator::name_at(27), "ab");
        assert_eq!(NameGenerator::name_at(26 + 26 * 26), "aaa");
    }

    #[test]
    fn test_local_renamed_consistently() {
        let out = apply(
            "class C { int M() { int counter = 1; counter = counter + 1; return counter; } }",
            &MinifierOptions {
                local_vars_compressing: true,
                ..MinifierOptions::with_base(false)
            },
        );
        assert!(!out.contains("counter"));
        // declaration and all three uses share one short name
        assert!(out.contains("int a = 1"));
        assert!(out.contains("a = a + 1"));
        assert!(out.contains("return a;"));
    }

    #[test]
    fn test_siblings_get_distinct_names() {
        let out = apply(
            "class C { void M() { int first = 1; int second = 2; second = first; } }",
            &MinifierOptions {
                local_vars_compressing: true,
                ..MinifierOptions::with_base(false)
            },
        );
        assert!(out.contains("int a = 1"));
        assert!(out.contains("int b = 2"));
        assert!(out.contains("b = a;"));
    }

    #[test]
    fn test_sibling_scopes_reuse_names() {
        let out = apply(
            "class C { void M() { if (true) { int one = 1; one = one; } if (true) { int two = 2; two = two; } } }",
            &MinifierOptions {
                local_vars_compressing: true,
                ..MinifierOptions::with_base(false)
            },
        );
        assert!(out.contains("int a = 1"));
        assert!(out.contains("int a = 2"));
    }

    #[test]
    fn test_member_toggle_off_keeps_name_and_occupies_it() {
        let options = MinifierOptions {
            local_vars_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        // Field `a` keeps its name; the local must not take `a`.
        let out = apply(
            "class C { int a; void M() { int value = 1; a = value; } }",
            &options,
        );
        assert!(out.contains("int a;"));
        assert!(out.contains("int b = 1"));
        assert!(out.contains("a = b;"));
    }

    #[test]
    fn test_rename_avoids_unresolved_names() {
        // `a` is referenced but declared nowhere in the source; the local
        // must skip it or calls to the external `a` would rebind.
        let options = MinifierOptions {
            local_vars_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        let out = apply(
            "class C { void M() { int value = a.b; value = value; } }",
            &options,
        );
        assert!(out.contains("int b = a.b"));
    }

    #[test]
    fn test_members_and_types_renamed_when_enabled() {
        let options = MinifierOptions {
            local_vars_compressing: true,
            members_compressing: true,
            types_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        let out = apply(
            "class Calculator { int total; int Add(int amount) { total = total + amount; return total; } }",
            &options,
        );
        assert!(!out.contains("Calculator"));
        assert!(!out.contains("total"));
        assert!(!out.contains("amount"));
        assert!(!out.contains("Add"));
    }

    #[test]
    fn test_public_member_not_renamed() {
        let options = MinifierOptions {
            members_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        let out = apply(
            "class C { public int Total; int hidden; void M() { hidden = Total; } }",
            &options,
        );
        assert!(out.contains("Total"));
        assert!(!out.contains("hidden"));
    }

    #[test]
    fn test_override_set_renamed_together() {
        let options = MinifierOptions {
            members_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        let out = apply(
            "class B { protected virtual int Fetch() { return 0; } } class D : B { protected override int Fetch() { return 1; } }",
            &options,
        );
        // protected is observable: neither side renamed
        assert_eq!(out.matches("Fetch").count(), 2);

        let out = apply(
            "class B { internal virtual int Fetch() { return 0; } } class D : B { internal override int Fetch() { return 1; } }",
            &options,
        );
        assert!(!out.contains("Fetch"));
        // both declarations got the same short name
        assert_eq!(out.matches("int a()").count(), 2);
    }

    #[test]
    fn test_keywords_skipped_by_generator() {
        let options = MinifierOptions {
            local_vars_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        // Enough locals to walk the alphabet past `as`, `do`, `if`, `in`, `is`
        let mut body = String::new();
        for i in 0..40 {
            body.push_str(&format!("int local{i} = {i}; "));
        }
        let out = apply(&format!("class C {{ void M() {{ {body} }} }}"), &options);
        for keyword in ["as", "do", "if", "in", "is"] {
            assert!(
                !out.contains(&format!("int {keyword} =")),
                "generator must skip keyword {keyword}"
            );
        }
    }

    #[test]
    fn test_rename_is_idempotent() {
        let options = MinifierOptions {
            local_vars_compressing: true,
            ..MinifierOptions::with_base(false)
        };
        let source = "class C { void M() { int value = 1; value = value; } }";
        let once = apply(source, &options);
        let twice = apply(&once, &options);
        assert_eq!(once, twice);
    }
}
