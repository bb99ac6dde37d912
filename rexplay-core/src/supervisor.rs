//! Deadline supervision of evaluation workers
//!
//! Each evaluation runs on its own worker thread while the caller's
//! thread polls for completion. When the deadline elapses the
//! supervisor signals the worker's [`CancelToken`], waits out a bounded
//! grace period, and returns the canonical timeout result whether or
//! not the worker actually stopped. The caller is never blocked past
//! deadline + grace.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::cancel::CancelToken;
use crate::planner::{DEFAULT_BACKTRACK_LIMIT, EvalRequest, EvalResult, MatchPlanner};

/// Construction-time timing and engine limits for a [`Supervisor`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum wall-clock time an evaluation may run before cancellation
    pub deadline: Duration,
    /// Bounded wait after cancellation for the worker to stop
    pub grace: Duration,
    /// How often the supervisor polls for worker completion
    pub poll_interval: Duration,
    /// Ceiling on engine backtracking steps per match attempt
    pub backtrack_limit: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            deadline: Duration::from_millis(5000),
            grace: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(50),
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

/// Executes evaluations on worker threads under a wall-clock deadline
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    config: EvalConfig,
}

impl Supervisor {
    /// Create a supervisor with the given configuration
    pub fn new(config: EvalConfig) -> Self {
        Supervisor { config }
    }

    /// The configuration this supervisor was built with
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate a request, bounded in wall-clock time by
    /// deadline + grace.
    ///
    /// A worker that cannot be stopped is abandoned: it holds nothing
    /// but its token and its own scan state, and terminates on its own
    /// at the next cancellation checkpoint or when the engine's
    /// backtrack limit trips.
    pub fn evaluate(&self, request: EvalRequest) -> EvalResult {
        let token = CancelToken::new();
        let worker_token = token.clone();
        let planner = MatchPlanner::new(self.config.backtrack_limit);
        let text = request.text.clone();
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("rexplay-worker".into())
            .spawn(move || {
                let result = planner.evaluate(&request, &worker_token);
                // The supervisor may have given up already; a closed
                // channel is fine.
                let _ = tx.send(result);
            });
        if let Err(err) = spawned {
            return EvalResult::failed(text, format!("failed to spawn evaluation worker: {}", err));
        }

        let started = Instant::now();
        loop {
            match rx.recv_timeout(self.config.poll_interval) {
                Ok(result) => {
                    debug!("evaluation finished in {:?}", started.elapsed());
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => {
                    if started.elapsed() >= self.config.deadline {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("evaluation worker terminated without a result");
                    return EvalResult::failed(text, "evaluation worker terminated unexpectedly");
                }
            }
        }

        warn!(
            "deadline of {:?} elapsed; cancelling evaluation",
            self.config.deadline
        );
        token.cancel();
        match rx.recv_timeout(self.config.grace) {
            Ok(_) | Err(RecvTimeoutError::Disconnected) => {
                debug!("worker stopped within the grace period");
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("worker ignored cancellation; abandoning it");
            }
        }
        EvalResult::timed_out()
    }
}
