//! Error types for minification

use crate::syntax::CsSpan;
use thiserror::Error;

/// Fatal errors for a single minification invocation. No partial output is
/// ever produced: the caller keeps its original text on failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MinifyError {
    /// The source could not be tokenized (unterminated literal or comment,
    /// invalid character).
    #[error("lex error: {message} at {}..{}", span.start, span.end)]
    Lex { message: String, span: CsSpan },

    /// The token sequence is structurally invalid (unbalanced delimiters,
    /// malformed declaration).
    #[error("parse error: {message} at {}..{}", span.start, span.end)]
    Parse { message: String, span: CsSpan },
}

/// Error kind enumeration for categorizing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
}

impl MinifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MinifyError::Lex { .. } => ErrorKind::Lex,
            MinifyError::Parse { .. } => ErrorKind::Parse,
        }
    }

    pub fn lex(message: impl Into<String>, span: CsSpan) -> Self {
        Self::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse(message: impl Into<String>, span: CsSpan) -> Self {
        Self::Parse {
            message: message.into(),
            span,
        }
    }
}
