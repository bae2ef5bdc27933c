//! Rowan language implementation for C#
//!
//! Connects [`CsSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::CsSyntaxKind;

/// Language implementation for C# source text.
///
/// Zero-sized type implementing `rowan::Language` so the syntax kinds can be
/// stored in Rowan's green tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(
            raw.0 <= CsSyntaxKind::Eof as u16,
            "unknown CsSyntaxKind discriminant: {}",
            raw.0
        );
        // Safety: CsSyntaxKind is repr(u16) with contiguous discriminants
        // from 0 through Eof, checked above.
        unsafe { std::mem::transmute::<u16, CsSyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Red-tree node over C# syntax.
pub type CsSyntaxNode = rowan::SyntaxNode<CsLanguage>;
/// Red-tree token over C# syntax.
pub type CsSyntaxToken = rowan::SyntaxToken<CsLanguage>;
/// Node-or-token element.
pub type CsSyntaxElement = rowan::SyntaxElement<CsLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            CsSyntaxKind::Whitespace,
            CsSyntaxKind::RegionStart,
            CsSyntaxKind::Ident,
            CsSyntaxKind::ClassKw,
            CsSyntaxKind::LBrace,
            CsSyntaxKind::CompilationUnit,
            CsSyntaxKind::NameRef,
            CsSyntaxKind::Eof,
        ];

        for &kind in &kinds {
            let raw = CsLanguage::kind_to_raw(kind);
            let back = CsLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "roundtrip failed for {kind:?}");
        }
    }

    #[test]
    #[should_panic(expected = "unknown CsSyntaxKind")]
    fn test_out_of_range_kind_panics() {
        let raw = rowan::SyntaxKind(CsSyntaxKind::Eof as u16 + 1);
        let _ = CsLanguage::kind_from_raw(raw);
    }
}
