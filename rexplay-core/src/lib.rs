//! Rexplay Core Library
//!
//! An interruptible, source-mapped regex evaluation engine. A pattern is
//! evaluated against a subject text to produce matched spans, per-group
//! spans mapped back to fragments of the pattern source, and an optional
//! substitution result. A wall-clock deadline with cooperative
//! cancellation protects the host process from catastrophic-backtracking
//! patterns.

pub mod cancel;
pub mod error;
pub mod planner;
pub mod scanner;
pub mod supervisor;

pub use cancel::{CancelToken, GuardedText};
pub use error::{EvalError, Result, Span, TIMEOUT_MESSAGE};
pub use planner::{DEFAULT_BACKTRACK_LIMIT, EvalRequest, EvalResult, MatchPlanner, MatchSpan};
pub use scanner::{GroupDescriptor, capture_fragments, capture_fragments_with, scan_groups};
pub use supervisor::{EvalConfig, Supervisor};

/// Evaluate a request under the default configuration
/// (5s deadline, 1s grace, 50ms poll interval).
///
/// This is the main entry point for one-shot callers.
pub fn evaluate(request: EvalRequest) -> EvalResult {
    Supervisor::new(EvalConfig::default()).evaluate(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // Full pipeline: pattern -> fragments -> spans -> substitution
        let result = evaluate(EvalRequest::new("12-34", r"(\d+)-(\d+)").with_replacement("$2/$1"));
        assert!(result.matched_whole);
        assert_eq!(result.spans.len(), 2);
        assert_eq!(result.replaced.as_deref(), Some("34/12"));
    }

    #[test]
    fn test_fragments_round_trip() {
        let fragments = capture_fragments(r"(a)(?:b)(c)");
        let labels: Vec<_> = fragments.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["(a)", "(c)"]);
    }
}
