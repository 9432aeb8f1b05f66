use crate::models::DownloadTask;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::debug;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue is closed, task {0} rejected")]
    Closed(String),
}

/// TaskEnvelope wraps a DownloadTask with its sequence number
#[derive(Clone, Debug)]
pub struct TaskEnvelope {
    pub seq: u64,
    pub task: DownloadTask,
}

/// Multi-producer/multi-consumer FIFO of download tasks
///
/// Lifecycle:
/// 1. Producer calls `enqueue` for every task (never blocks, unbounded)
/// 2. Producer calls `close`; consumers keep draining what is left
/// 3. Consumers loop on `dequeue` until it returns `None`, calling
///    `task_done` once per dequeued task
/// 4. `join` resolves once every enqueued task has been marked done
///
/// Cloning is cheap and every clone shares the same underlying channel.
#[derive(Clone)]
pub struct WorkQueue {
    tx: async_channel::Sender<TaskEnvelope>,
    rx: async_channel::Receiver<TaskEnvelope>,
    pending: Arc<AtomicUsize>,
    next_seq: Arc<AtomicU64>,
    drained: Arc<Notify>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self {
            tx,
            rx,
            pending: Arc::new(AtomicUsize::new(0)),
            next_seq: Arc::new(AtomicU64::new(0)),
            drained: Arc::new(Notify::new()),
        }
    }

    /// Append a task and return its sequence number
    pub fn enqueue(&self, task: DownloadTask) -> Result<u64, QueueError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.pending.fetch_add(1, Ordering::SeqCst);

        if let Err(err) = self.tx.try_send(TaskEnvelope { seq, task }) {
            self.mark_done();
            return Err(QueueError::Closed(err.into_inner().task.identifier));
        }

        debug!(seq, "Task enqueued");
        Ok(seq)
    }

    /// Take the next task, waiting if none is available yet.
    /// Returns `None` once the queue is closed and empty.
    pub async fn dequeue(&self) -> Option<TaskEnvelope> {
        self.rx.recv().await.ok()
    }

    /// Stop accepting tasks; already queued tasks stay available
    pub fn close(&self) {
        self.tx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Mark one dequeued task as fully processed
    pub fn task_done(&self) {
        self.mark_done();
    }

    fn mark_done(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Tasks enqueued but not yet marked done
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Tasks still waiting in the channel
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Wait until the queue is empty and every dequeued task has been marked done
    pub async fn join(&self) {
        loop {
            // Register before checking so a concurrent notify is not lost
            let notified = self.drained.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
