//! Cooperative cancellation for in-flight evaluations
//!
//! The matching engine exposes no preemption hook, so the only universal
//! way to stop it is to make the evaluation's own reads of the subject
//! text fail once a shared flag is set. [`CancelToken`] is that flag;
//! [`GuardedText`] is the text view that checks it on every access and
//! unwinds out of the evaluation with [`EvalError::Cancelled`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EvalError, Result};

/// A shared, thread-safe cancellation flag.
///
/// The token transitions unset -> cancelled exactly once per evaluation
/// and is never reset; a second [`cancel`](CancelToken::cancel) is a
/// no-op.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, unset token
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    /// Set the flag. Permanent for the lifetime of the token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check whether the flag has been set
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with [`EvalError::Cancelled`] if the flag has been set
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EvalError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A view over the subject text whose every access runs a cancellation
/// checkpoint first.
///
/// The planner reaches the subject text only through this view, so each
/// engine call and each span extraction is a point where a cancelled
/// evaluation unwinds instead of making further progress.
#[derive(Debug)]
pub struct GuardedText<'t> {
    text: &'t str,
    token: CancelToken,
}

impl<'t> GuardedText<'t> {
    /// Wrap `text` so that reads are gated on `token`
    pub fn new(text: &'t str, token: CancelToken) -> Self {
        GuardedText { text, token }
    }

    /// Length in bytes of the underlying text
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the underlying text is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Access the full text, failing if cancellation has been signaled
    pub fn as_str(&self) -> Result<&'t str> {
        self.token.checkpoint()?;
        Ok(self.text)
    }

    /// Access a byte range of the text, failing if cancellation has been
    /// signaled
    pub fn slice(&self, start: usize, end: usize) -> Result<&'t str> {
        self.token.checkpoint()?;
        Ok(&self.text[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_unset() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.checkpoint().is_ok());
    }

    #[test]
    fn test_cancel_is_permanent_and_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.checkpoint(), Err(EvalError::Cancelled)));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_guarded_text_reads_until_cancelled() {
        let token = CancelToken::new();
        let text = GuardedText::new("hello", token.clone());

        assert_eq!(text.as_str().unwrap(), "hello");
        assert_eq!(text.slice(1, 3).unwrap(), "el");
        assert_eq!(text.len(), 5);
        assert!(!text.is_empty());
        assert!(GuardedText::new("", token.clone()).is_empty());

        token.cancel();
        assert!(matches!(text.as_str(), Err(EvalError::Cancelled)));
        assert!(matches!(text.slice(0, 1), Err(EvalError::Cancelled)));
    }

    #[test]
    fn test_cancel_observed_across_threads() {
        let token = CancelToken::new();
        let worker = token.clone();
        let handle = std::thread::spawn(move || {
            while !worker.is_cancelled() {
                std::thread::yield_now();
            }
            true
        });
        token.cancel();
        assert!(handle.join().unwrap());
    }
}
