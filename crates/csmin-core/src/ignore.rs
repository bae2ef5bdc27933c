//! The cross-cutting "never touch" filter
//!
//! One shared read-only object consulted by every pass: identifiers are
//! matched exactly; comment and region directive texts are matched by
//! literal substring containment (an entry occurring anywhere in the
//! trivia's full text protects it). No pattern language.

/// Identifiers never renamed and comment texts never stripped.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    ids: Vec<String>,
    comments: Vec<String>,
}

impl IgnoreFilter {
    pub fn new(
        ids: impl IntoIterator<Item = impl Into<String>>,
        comments: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-name check for identifiers.
    pub fn keeps_identifier(&self, name: &str) -> bool {
        self.ids.iter().any(|id| id == name)
    }

    /// Containment check against a comment's or directive's full text,
    /// delimiters included.
    pub fn keeps_comment(&self, text: &str) -> bool {
        self.comments.iter().any(|entry| text.contains(entry))
    }

    /// A short name the generator must not hand out: it would capture
    /// references to an identifier the caller promised not to touch.
    pub fn reserves_name(&self, candidate: &str) -> bool {
        self.keeps_identifier(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_matching_is_exact() {
        let filter = IgnoreFilter::new(["keepMe"], Vec::<String>::new());
        assert!(filter.keeps_identifier("keepMe"));
        assert!(!filter.keeps_identifier("keepMe2"));
        assert!(!filter.keeps_identifier("keep"));
    }

    #[test]
    fn test_comment_matching_is_containment() {
        let filter = IgnoreFilter::new(
            Vec::<String>::new(),
            ["unremovableComment", "/*unremovableComment1*/"],
        );
        assert!(filter.keeps_comment("// unremovableComment and more"));
        assert!(filter.keeps_comment("/*unremovableComment1*/"));
        assert!(!filter.keeps_comment("// some other comment"));
    }

    #[test]
    fn test_empty_filter_keeps_nothing() {
        let filter = IgnoreFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.keeps_identifier("x"));
        assert!(!filter.keeps_comment("// x"));
    }
}
