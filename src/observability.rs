//! Observability: tracing setup and run counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global fmt subscriber; `RUST_LOG` overrides the default `info` filter
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    tasks_enqueued: AtomicU64,
    downloads_succeeded: AtomicU64,
    downloads_failed: AtomicU64,
    fallback_used: AtomicU64,
    bytes_written: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_enqueued(&self) {
        self.tasks_enqueued.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "tasks_enqueued", "Metric incremented");
    }

    pub fn download_succeeded(&self) {
        self.downloads_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "downloads_succeeded", "Metric incremented");
    }

    pub fn download_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "downloads_failed", "Metric incremented");
    }

    pub fn fallback_used(&self) {
        self.fallback_used.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "fallback_used", "Metric incremented");
    }

    pub fn bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_enqueued: self.tasks_enqueued.load(Ordering::Relaxed),
            downloads_succeeded: self.downloads_succeeded.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            fallback_used: self.fallback_used.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub tasks_enqueued: u64,
    pub downloads_succeeded: u64,
    pub downloads_failed: u64,
    pub fallback_used: u64,
    pub bytes_written: u64,
}
