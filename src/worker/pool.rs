//! Fixed-size worker pool draining the work queue

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info};

use super::fetcher::Fetcher;
use super::runner;
use crate::ledger::OutcomeLedger;
use crate::models::FetchOutcome;
use crate::observability::Metrics;
use crate::queue::{TaskEnvelope, WorkQueue};

/// Shared stop flag checked by workers between tasks
///
/// Once cancelled, workers keep draining the queue but record every remaining
/// task as a failure without touching the network.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct WorkerPool {
    size: usize,
    fetcher: Fetcher,
    ledger: Arc<OutcomeLedger>,
    metrics: Arc<Metrics>,
    cancel: CancelFlag,
}

impl WorkerPool {
    pub fn new(
        size: usize,
        fetcher: Fetcher,
        ledger: Arc<OutcomeLedger>,
        metrics: Arc<Metrics>,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            size: size.max(1),
            fetcher,
            ledger,
            metrics,
            cancel,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawn the workers and wait until every queued task has an outcome.
    ///
    /// The queue must be closed by the caller, otherwise workers idle on an
    /// empty queue forever.
    pub async fn run(&self, queue: &WorkQueue) {
        info!(workers = self.size, tasks = queue.len(), "Starting worker pool");

        let mut workers = JoinSet::new();
        for worker_id in 0..self.size {
            workers.spawn(
                worker_loop(
                    worker_id,
                    queue.clone(),
                    self.fetcher.clone(),
                    self.ledger.clone(),
                    self.metrics.clone(),
                    self.cancel.clone(),
                )
                .in_current_span(),
            );
        }

        // Workers return once the queue is closed and empty
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Worker task terminated abnormally");
            }
        }

        // Tasks a dead worker never reached are still queued
        if queue.is_closed() {
            while let Some(envelope) = queue.dequeue().await {
                self.record(FetchOutcome::failure(envelope.task.identifier));
                queue.task_done();
            }
        }

        let pending = queue.pending();
        if pending > 0 {
            error!(pending, "Tasks left without an outcome");
        }

        debug!("Worker pool drained");
    }

    fn record(&self, outcome: FetchOutcome) {
        record_outcome(&self.ledger, &self.metrics, outcome);
    }
}

fn record_outcome(ledger: &OutcomeLedger, metrics: &Metrics, outcome: FetchOutcome) {
    if outcome.status.is_success() {
        metrics.download_succeeded();
    } else {
        metrics.download_failed();
    }
    ledger.append(outcome);
}

/// Run one task on its own tokio task so a panic costs only that task
async fn run_isolated(worker_id: usize, envelope: TaskEnvelope, fetcher: Fetcher) -> FetchOutcome {
    let identifier = envelope.task.identifier.clone();
    let seq = envelope.seq;

    let handle = tokio::spawn(
        async move { runner::process_task(&envelope, &fetcher).await }.in_current_span(),
    );

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(worker_id, seq, identifier = %identifier, error = %e, "Download task aborted");
            FetchOutcome::failure(identifier)
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: WorkQueue,
    fetcher: Fetcher,
    ledger: Arc<OutcomeLedger>,
    metrics: Arc<Metrics>,
    cancel: CancelFlag,
) {
    debug!(worker_id, "Worker started");

    while let Some(envelope) = queue.dequeue().await {
        let outcome = if cancel.is_cancelled() {
            debug!(worker_id, seq = envelope.seq, "Run cancelled, skipping task");
            FetchOutcome::failure(envelope.task.identifier.clone())
        } else {
            run_isolated(worker_id, envelope, fetcher.clone()).await
        };

        record_outcome(&ledger, &metrics, outcome);
        queue.task_done();
    }

    debug!(worker_id, "Worker finished, queue drained");
}
