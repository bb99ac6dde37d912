//! Error types for the evaluation engine
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: pattern compilation, engine
//! runtime failures, cancellation, or deadline expiry.

use thiserror::Error;

/// The canonical message reported when an evaluation exceeds its deadline.
pub const TIMEOUT_MESSAGE: &str = "Regex processing timed out.";

/// The main error type for the evaluation engine
#[derive(Error, Debug)]
pub enum EvalError {
    /// The pattern failed to compile
    #[error("invalid pattern: {0}")]
    Compile(fancy_regex::Error),

    /// The engine failed while running a match attempt
    /// (e.g. the backtrack limit was exceeded)
    #[error("match failed: {0}")]
    Engine(fancy_regex::Error),

    /// A cancellation checkpoint fired mid-evaluation
    #[error("evaluation cancelled")]
    Cancelled,

    /// The evaluation exceeded its wall-clock deadline
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,
}

/// A span representing a byte range in a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: usize,
    /// End position (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvalError>;
