//! Error types shared across decoding, encoding and estimation.
//!
//! Three policies apply:
//!
//! - [`InvariantViolation`] is a defect. It is returned from the public decode and encode
//!   operations and must never be swallowed into an empty result.
//! - [`ParseError`] and [`ReconstructError`] are ordinary failures. The decoder logs them and
//!   falls back to an empty result for the affected sub-component.
//! - [`CountError`] terminates the estimator channel it occurred on.

use thiserror::Error;

/// A condition that can only arise from a programming or configuration defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Random sampling without a fixed seed reshuffles the results on every page load.
    #[error("sample size {size} is set without a sample seed")]
    SampleWithoutSeed { size: u32 },
    /// The corpus declares a metadata uiType the filter decoder has no rule for.
    #[error("metadata field '{field}' declares unsupported uiType '{ui_type}'")]
    UnsupportedUiType { field: String, ui_type: String },
}

/// Failure to parse pattern or filter text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at position {position})")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self { position, message: message.into() }
    }
}

/// Reasons a token sequence cannot be flattened into per-annotation values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    #[error("token {index} uses xml tags, repetition or is optional")]
    ComplexToken { index: usize },
    #[error("attributes on a token must be combined with AND, found OR in token {index}")]
    NonConjunctive { index: usize },
    #[error("negated expression in token {index}")]
    Negation { index: usize },
    #[error("attribute '{name}' uses comparator '{comparator}', only '=' is supported")]
    UnsupportedComparator { name: String, comparator: String },
    /// Values for an annotation must cover tokens `0..n` without holes or duplicates.
    #[error("annotation '{name}' has {found} values before token {index}")]
    Gap { name: String, index: usize, found: usize },
}

/// Failure reported by a count service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error("count request failed: {0}")]
    Request(String),
    #[error("count request returned status {status}: {message}")]
    Status { status: u16, message: String },
}
