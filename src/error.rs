//! Error types for the text layer library.
//!
//! This module defines all error types that can occur while building a page
//! text layer or while manipulating a selection over it.

/// Result type alias for text layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during text layer processing.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// A page number, word index or letter index lies outside its valid range
    #[error("{what} out of range: {value} (valid: {min}..={max})")]
    OutOfRange {
        /// Name of the offending quantity
        what: &'static str,
        /// Value that was supplied
        value: usize,
        /// Smallest accepted value
        min: usize,
        /// Largest accepted value
        max: usize,
    },

    /// A caller supplied an argument that violates a documented precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Geometry or internal state is degenerate (NaN angle, zero-length vector, ...)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The operation was cancelled through a [`CancelFlag`](crate::selection::CancelFlag)
    #[error("Operation cancelled")]
    Cancelled,

    /// The glyph source failed to provide a page
    #[error("Failed to load page {page_number}: {reason}")]
    PageLoad {
        /// 1-based page number
        page_number: usize,
        /// Reason reported by the glyph source
        reason: String,
    },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a 1-based page number violation.
    pub(crate) fn page_out_of_range(page_number: usize, page_count: usize) -> Self {
        Error::OutOfRange {
            what: "page number",
            value: page_number,
            min: 1,
            max: page_count,
        }
    }

    /// Shorthand for a 0-based index violation against a collection of `len` items.
    pub(crate) fn index_out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Error::OutOfRange {
            what,
            value: index,
            min: 0,
            max: len.saturating_sub(1),
        }
    }
}
