//! Green-tree builder wrapper
//!
//! Thin layer over `rowan::GreenNodeBuilder` so the parser works in terms of
//! [`CsSyntaxKind`] directly.

use rowan::{Checkpoint, GreenNodeBuilder, Language};

use super::{CsLanguage, CsSyntaxKind, CsSyntaxNode};

/// Builder for the lossless C# CST.
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            inner: GreenNodeBuilder::new(),
        }
    }

    pub fn start_node(&mut self, kind: CsSyntaxKind) {
        self.inner.start_node(CsLanguage::kind_to_raw(kind));
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn token(&mut self, kind: CsSyntaxKind, text: &str) {
        self.inner.token(CsLanguage::kind_to_raw(kind), text);
    }

    /// Mark a position so a node can later be wrapped around everything
    /// added since.
    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.checkpoint()
    }

    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.inner
            .start_node_at(checkpoint, CsLanguage::kind_to_raw(kind));
    }

    pub fn finish(self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.inner.finish())
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
