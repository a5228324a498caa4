//! Error types for treemap layout and navigation.

use thiserror::Error;

/// Broad category of a [`LayoutError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The sibling list cannot be laid out (empty, or no weight to distribute).
    DegenerateInput,
    /// A programming contract was broken upstream of the failing call.
    InvariantViolation,
    /// A navigation request referenced a cell that is not on screen.
    Navigation,
}

/// Errors raised by the layout engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// No siblings at this hierarchy level.
    #[error("degenerate input: sibling list is empty")]
    EmptyLevel,

    /// The siblings' magnitudes sum to zero, a negative number, or NaN.
    #[error("degenerate input: total magnitude {total} is not positive")]
    NonPositiveTotal {
        /// The offending sum.
        total: f64,
    },

    /// A precondition that earlier stages guarantee did not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// `select_cell` was given a rectangle from an earlier layout.
    #[error("cell '{label}' is not part of the current layout")]
    StaleCell {
        /// Label of the node behind the stale rectangle.
        label: String,
    },

    /// `select_index` was given an index past the end of the current layout.
    #[error("no cell at index {index} (current layout has {len})")]
    NoSuchCell {
        /// Requested index.
        index: usize,
        /// Number of cells currently laid out.
        len: usize,
    },
}

impl LayoutError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyLevel | Self::NonPositiveTotal { .. } => ErrorKind::DegenerateInput,
            Self::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Self::StaleCell { .. } | Self::NoSuchCell { .. } => ErrorKind::Navigation,
        }
    }

    /// Whether the caller can reasonably carry on, e.g. by showing an empty
    /// state or re-reading the current layout.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::InvariantViolation)
    }

    /// Shorthand for [`LayoutError::InvariantViolation`].
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

/// Result alias used throughout canopy.
pub type Result<T> = std::result::Result<T, LayoutError>;
