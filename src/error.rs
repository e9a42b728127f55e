//! Error types.
//!
//! Programmer-contract violations are not represented here; they are
//! `debug_assert!`s at the call site.

use thiserror::Error;

use crate::chan::ControlId;

/// Failure to bind an animation to a part bundle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("animation hierarchy `{anim}` does not match part hierarchy `{part}`")]
    HierarchyMismatch { part: String, anim: String },

    #[error("root name `{anim}` does not match bundle `{part}`")]
    RootNameMismatch { part: String, anim: String },

    #[error("no control with id {0:?}")]
    UnknownControl(ControlId),
}

/// Failure while reading or writing a Bam stream.
#[derive(Debug, Error)]
pub enum BamError {
    #[error("datagram truncated: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("not a bam stream")]
    BadHeader,

    #[error("unsupported bam version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("expected object of type `{expected}`, found `{found}`")]
    UnexpectedType { expected: String, found: String },

    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("object {object} requested {requested} pointers but consumed {consumed}")]
    PointerCountMismatch {
        object: u32,
        requested: usize,
        consumed: usize,
    },

    #[error("stream contains no root object")]
    MissingRoot,
}
