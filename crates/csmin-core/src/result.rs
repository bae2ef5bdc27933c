//! Crate-wide result alias

use crate::error::MinifyError;

/// Result type used across the engine.
pub type Result<T> = std::result::Result<T, MinifyError>;
