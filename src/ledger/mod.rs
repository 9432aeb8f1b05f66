//! Outcome ledger: the run-wide, append-only record of per-task outcomes
//!
//! Every worker appends exactly one [`FetchOutcome`] per task it dequeued.
//! Appends are serialized by a mutex; nothing is ever removed or rewritten.
//! The orchestrator reads the ledger with [`OutcomeLedger::snapshot`] only
//! after the worker pool has joined.

use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use crate::models::{FetchOutcome, FetchStatus};

#[derive(Debug, Default)]
pub struct OutcomeLedger {
    outcomes: Mutex<Vec<FetchOutcome>>,
}

impl OutcomeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    // A panicking worker cannot leave a half-pushed Vec behind, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<FetchOutcome>> {
        self.outcomes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one outcome; safe to call from any worker concurrently
    pub fn append(&self, outcome: FetchOutcome) {
        trace!(identifier = %outcome.identifier, status = %outcome.status, "Outcome recorded");
        self.lock().push(outcome);
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> Vec<FetchOutcome> {
        self.lock().clone()
    }

    /// (successes, failures)
    pub fn tally(&self) -> (usize, usize) {
        let outcomes = self.lock();
        let successes = outcomes
            .iter()
            .filter(|o| o.status == FetchStatus::Success)
            .count();
        (successes, outcomes.len() - successes)
    }

}
