//! Minifier configuration
//!
//! All toggles are independent booleans; `line_length` is a soft wrapping
//! limit where `0` means unconstrained. The record is serde-enabled so build
//! pipelines can carry it in their own configuration files; discovering and
//! loading those files is outside the engine.

use serde::{Deserialize, Serialize};

/// Options controlling which transformations run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinifierOptions {
    /// Collapse insignificant whitespace.
    pub spaces_removing: bool,
    /// Strip line and block comments.
    pub comments_removing: bool,
    /// Strip `#region`/`#endregion` directives.
    pub regions_removing: bool,
    /// Rename local variables and parameters.
    pub local_vars_compressing: bool,
    /// Rename non-observable members.
    pub members_compressing: bool,
    /// Rename non-observable types.
    pub types_compressing: bool,
    /// Miscellaneous syntactic simplifications.
    pub misc_compressing: bool,
    /// Maximum output line length; `0` disables wrapping.
    pub line_length: usize,
}

impl MinifierOptions {
    /// Every toggle set to `base`; individual fields can then be
    /// overridden with struct-update syntax.
    pub fn with_base(base: bool) -> Self {
        Self {
            spaces_removing: base,
            comments_removing: base,
            regions_removing: base,
            local_vars_compressing: base,
            members_compressing: base,
            types_compressing: base,
            misc_compressing: base,
            line_length: 0,
        }
    }

    /// True when any identifier-compression toggle is on.
    pub fn any_compressing(&self) -> bool {
        self.local_vars_compressing || self.members_compressing || self.types_compressing
    }
}

impl Default for MinifierOptions {
    fn default() -> Self {
        Self::with_base(true)
    }
}
