//! Shared plumbing for the end-to-end minifier tests
//!
//! Loads every C# sample under `tests/samples/` into a name → source map,
//! and provides the structural compile oracle the tests assert minified
//! output against: the engine's own lexer and parser must accept the
//! output without errors. (The original system used a full compiler as the
//! oracle; that stays an external collaborator.)

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csmin_core::parse;

/// All sample sources keyed by file stem, in stable order.
pub fn samples() -> Result<BTreeMap<String, String>> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/samples");
    let mut out = BTreeMap::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("cs") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("sample file stem")?
            .to_string();
        let code = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        out.insert(name, code);
    }
    anyhow::ensure!(!out.is_empty(), "no samples found in {}", dir.display());
    Ok(out)
}

/// The structural oracle: output must lex and parse cleanly.
pub fn assert_still_valid(code: &str, context: &str) {
    let (_, lex_errors, parse_errors) = parse(code);
    assert!(
        lex_errors.is_empty(),
        "{context}: minified output has lex errors: {lex_errors:?}\n---\n{code}"
    );
    assert!(
        parse_errors.is_empty(),
        "{context}: minified output has parse errors: {parse_errors:?}\n---\n{code}"
    );
}

/// Significant (kind, text) pairs, for checks that a pass must not change
/// tokenization.
pub fn significant_tokens(code: &str) -> Vec<(csmin_core::CsSyntaxKind, String)> {
    let (tokens, _) = csmin_core::lex_with_trivia(code);
    tokens
        .into_iter()
        .filter(|t| !t.kind.is_trivia() && t.kind != csmin_core::CsSyntaxKind::Eof)
        .map(|t| (t.kind, t.text))
        .collect()
}
