//! # Core Error Types
//!
//! Errors raised by constructors and by element access on empty containers.
//! Exhaustion and missing keys are not errors: they come back as `None` or
//! `false`.

use thiserror::Error;

/// Errors that can occur in the container and memory subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A constructor was given a zero size or capacity.
    #[error("{what} must be greater than zero")]
    ZeroCapacity {
        /// Which parameter was zero.
        what: &'static str,
    },

    /// Element access on an empty container.
    #[error("{0} is empty")]
    EmptyContainer(&'static str),

    /// Alignment that is not a power of two.
    #[error("alignment must be a power of two, got {0}")]
    InvalidAlignment(usize),

    /// Size and alignment do not form a valid allocation layout.
    #[error("cannot allocate {size} bytes aligned to {alignment}")]
    LayoutOverflow {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        alignment: usize,
    },

    /// Checked element access past the end.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of elements.
        len: usize,
    },

    /// More initial elements than a fixed-capacity container holds.
    #[error("more than {capacity} elements supplied")]
    TooManyElements {
        /// Fixed capacity of the container.
        capacity: usize,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
