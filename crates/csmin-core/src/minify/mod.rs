//! The transformation passes and their fixed composition order
//!
//! Each pass is independently toggleable; the order is load-bearing:
//! regions and comments go first so the whitespace compactor can collapse
//! what they leave behind, renaming happens before whitespace so separator
//! decisions see final token text, and the serializer runs last.

pub mod comments;
pub mod identifiers;
pub mod misc;
pub mod printer;
pub mod regions;
pub mod whitespace;

use tracing::debug;

use crate::ignore::IgnoreFilter;
use crate::options::MinifierOptions;
use crate::semantic::SymbolTable;
use crate::syntax::{CsSyntaxNode, TokenStream};

/// Run every enabled pass over the stream and serialize.
pub(crate) fn run_passes(
    mut stream: TokenStream,
    cst: &CsSyntaxNode,
    table: &SymbolTable,
    options: &MinifierOptions,
    ignore: &IgnoreFilter,
) -> String {
    if options.regions_removing {
        debug!("pass: region stripper");
        regions::strip_regions(&mut stream, ignore);
    }
    if options.comments_removing {
        debug!("pass: comment stripper");
        comments::strip_comments(&mut stream, ignore);
    }
    if options.any_compressing() {
        debug!("pass: identifier compressor");
        let renames = identifiers::compress_identifiers(table, options, ignore);
        for token in &mut stream.tokens {
            if let Some(new_text) = renames.get(&token.offset) {
                token.text = new_text.clone();
            }
        }
    }
    if options.misc_compressing {
        debug!("pass: misc simplifier");
        let drops = misc::misc_simplifications(cst);
        misc::apply_drops(&mut stream, &drops);
    }
    if options.spaces_removing {
        debug!("pass: whitespace compactor");
        whitespace::compact_whitespace(&mut stream);
    }
    printer::print(&stream, options.line_length)
}
