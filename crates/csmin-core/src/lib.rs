//! csmin core
//!
//! Engine for shrinking C# source text without changing compiled behavior:
//! a lossless lexer and CST, a lightweight symbol resolver, independently
//! toggleable transformation passes (regions, comments, identifier
//! compression, misc simplifications, whitespace), and a width-aware
//! serializer.
//!
//! The engine is a pure function of (source text, options, ignore set):
//! no cross-invocation state, deterministic output, and fatal lex/parse
//! errors instead of partial results.

pub mod error;
pub mod ignore;
pub mod minifier;
pub mod minify;
pub mod options;
pub mod result;
pub mod semantic;
pub mod syntax;

pub use error::{ErrorKind, MinifyError};
pub use ignore::IgnoreFilter;
pub use minifier::Minifier;
pub use options::MinifierOptions;
pub use result::Result;
pub use semantic::{Symbol, SymbolKind, SymbolTable, Visibility, resolve};
pub use syntax::{
    CsLanguage, CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, LexError, ParseError, TokenStream,
    lex_with_trivia, parse,
};

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csmin=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
