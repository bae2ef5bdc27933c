//! The public minification facade
//!
//! One `Minifier` holds the options and the ignore filter; `minify` is a
//! pure function of its input. Each invocation owns its tokens, tree and
//! symbol table exclusively, so batches parallelize trivially — that is
//! what [`Minifier::minify_many`] does, one invocation per rayon worker.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::error::MinifyError;
use crate::ignore::IgnoreFilter;
use crate::minify::run_passes;
use crate::options::MinifierOptions;
use crate::result::Result;
use crate::semantic::resolve;
use crate::syntax::{TokenStream, parse};

/// C# source minifier.
#[derive(Debug, Clone, Default)]
pub struct Minifier {
    options: MinifierOptions,
    ignore: IgnoreFilter,
}

impl Minifier {
    pub fn new(options: MinifierOptions) -> Self {
        Self {
            options,
            ignore: IgnoreFilter::default(),
        }
    }

    /// Construct with identifiers never renamed and comment texts never
    /// stripped.
    pub fn with_ignored(
        options: MinifierOptions,
        ids: impl IntoIterator<Item = impl Into<String>>,
        comments: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            options,
            ignore: IgnoreFilter::new(ids, comments),
        }
    }

    pub fn options(&self) -> &MinifierOptions {
        &self.options
    }

    /// Minify one source text. Total over syntactically valid input; fails
    /// with a lex or parse error otherwise, producing no partial output.
    #[instrument(skip_all, fields(len = source.len()))]
    pub fn minify(&self, source: &str) -> Result<String> {
        let (cst, lex_errors, parse_errors) = parse(source);
        if let Some(first) = lex_errors.first() {
            return Err(MinifyError::lex(first.message.clone(), first.span.clone()));
        }
        if let Some(first) = parse_errors.first() {
            return Err(MinifyError::parse(
                first.message.clone(),
                first.span.clone(),
            ));
        }
        debug_assert_eq!(cst.text().to_string(), source, "CST must be lossless");

        let table = resolve(&cst);
        debug!(
            symbols = table.symbols.len(),
            scopes = table.scopes.len(),
            unresolved = table.unresolved.len(),
            "resolved"
        );

        let (tokens, _) = crate::syntax::lex_with_trivia(source);
        let stream = TokenStream::from_lexed(&tokens);
        Ok(run_passes(stream, &cst, &table, &self.options, &self.ignore))
    }

    /// Minify a batch, one independent invocation per worker. Results come
    /// back in input order.
    pub fn minify_many(&self, sources: &[&str]) -> Vec<Result<String>> {
        sources.par_iter().map(|s| self.minify(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_produces_lex_error() {
        let minifier = Minifier::new(MinifierOptions::default());
        let err = minifier.minify("class C { string s = \"oops; }").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Lex);
    }

    #[test]
    fn test_unbalanced_input_produces_parse_error() {
        let minifier = Minifier::new(MinifierOptions::default());
        let err = minifier.minify("class C { void M() {").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_everything_disabled_is_identity() {
        let minifier = Minifier::new(MinifierOptions::with_base(false));
        let source = "class C\n{\n    // note\n    int x = 1;\n}\n";
        assert_eq!(minifier.minify(source).unwrap(), source);
    }

    #[test]
    fn test_minify_many_matches_minify() {
        let minifier = Minifier::new(MinifierOptions::default());
        let sources = [
            "class A { int x = 1; }",
            "class B { void M() { int y = 2; y = y; } }",
        ];
        let batch = minifier.minify_many(&sources);
        for (source, result) in sources.iter().zip(batch) {
            assert_eq!(result.unwrap(), minifier.minify(source).unwrap());
        }
    }

    #[test]
    fn test_determinism() {
        let minifier = Minifier::new(MinifierOptions::default());
        let source = "class C { int alpha; void M() { int beta = alpha; beta = beta; } }";
        let a = minifier.minify(source).unwrap();
        let b = minifier.minify(source).unwrap();
        assert_eq!(a, b);
    }
}
