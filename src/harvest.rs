//! Run orchestration
//!
//! One run is three strictly sequential phases:
//! 1. load the candidate list and the previous status table, reconcile them
//!    and populate the work queue (single task),
//! 2. drain the queue with the worker pool (concurrent),
//! 3. merge new outcomes with carried-over successes and rewrite the status
//!    table (single task).
//!
//! `WorkerPool::run` joining is the barrier between phases 2 and 3.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::humanize::ByteSize;
use crate::ledger::OutcomeLedger;
use crate::observability::Metrics;
use crate::queue::{QueueError, WorkQueue};
use crate::reconcile;
use crate::storage::{StorageClient, StorageError};
use crate::table::{self, TableError};
use crate::worker::{CancelFlag, DownloadError, Fetcher, HttpClient, PdfSource, WorkerPool, runner};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Cannot create destination directory {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Cannot build HTTP client: {0}")]
    Http(#[from] DownloadError),
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Nothing left to download; no files or tables were touched
    pub skipped: bool,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Successes from earlier runs copied into the new status table
    pub carried_over: usize,
    pub bytes_written: u64,
}

pub struct Harvester {
    config: Config,
    source: Arc<dyn PdfSource>,
    metrics: Arc<Metrics>,
    cancel: CancelFlag,
}

impl Harvester {
    pub fn new(config: Config, source: Arc<dyn PdfSource>) -> Self {
        Self {
            config,
            source,
            metrics: Arc::new(Metrics::new()),
            cancel: CancelFlag::new(),
        }
    }

    /// Harvester downloading over HTTP with the configured client settings
    pub fn with_http(config: Config) -> Result<Self, HarvestError> {
        let client = HttpClient::new(&config.http)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Flag that makes the current run skip all remaining downloads
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<RunSummary, HarvestError> {
        let run_id = Uuid::now_v7();
        self.run_inner()
            .instrument(info_span!("harvest", %run_id))
            .await
    }

    async fn run_inner(&self) -> Result<RunSummary, HarvestError> {
        let columns = &self.config.columns;
        let status_path = &self.config.input.status;

        let source_rows = table::read_candidates(&self.config.input.source, columns)?;
        let prior = table::read_status_table(status_path, columns)?;
        let plan = reconcile::load_candidates(source_rows, prior.as_ref());
        let carried_over = plan.prior_successes.len();

        if plan.is_empty() {
            info!(carried_over, "Every candidate is already downloaded, nothing to do");
            return Ok(RunSummary {
                skipped: true,
                carried_over,
                ..RunSummary::default()
            });
        }

        let destination = &self.config.output.destination;
        tokio::fs::create_dir_all(destination)
            .await
            .map_err(|source| HarvestError::Destination {
                path: destination.clone(),
                source,
            })?;
        let storage = StorageClient::local(destination)?;
        let fetcher = Fetcher::new(self.source.clone(), storage, self.metrics.clone());
        let bytes_before = self.metrics.snapshot().bytes_written;

        let queue = WorkQueue::new();
        for row in plan.candidates {
            queue.enqueue(runner::build_task(row))?;
            self.metrics.task_enqueued();
        }
        queue.close();
        let attempted = queue.pending();

        let ledger = Arc::new(OutcomeLedger::with_capacity(attempted));
        let pool = WorkerPool::new(
            self.config.worker.effective_pool_size(attempted),
            fetcher,
            ledger.clone(),
            self.metrics.clone(),
            self.cancel.clone(),
        );
        pool.run(&queue).await;

        if self.cancel.is_cancelled() {
            warn!("Run cancelled, unattempted reports are recorded as failed");
        }

        let (succeeded, failed) = ledger.tally();
        let merged = reconcile::merge(ledger.snapshot(), plan.prior_successes);
        table::write_status_table(status_path, &merged, columns)?;

        let bytes_written = self.metrics.snapshot().bytes_written - bytes_before;
        info!(
            attempted,
            succeeded,
            failed,
            carried_over,
            written = %ByteSize(bytes_written),
            "Run complete"
        );

        Ok(RunSummary {
            skipped: false,
            attempted,
            succeeded,
            failed,
            carried_over,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchStatus;
    use crate::worker::fetcher::tests::ScriptedSource;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, pool_size: usize) -> Config {
        let mut config = Config::default();
        config.input.source = dir.path().join("reports.csv");
        config.input.status = dir.path().join("status.csv");
        config.output.destination = dir.path().join("files");
        config.worker.pool_size = pool_size;
        config
    }

    fn pdf_names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_fallback_scenario() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 10);
        fs::write(
            &config.input.source,
            "BRnum,Pdf_URL,Report Html Address\n1,u1,\n2,,\n3,u3,u3b\n",
        )
        .unwrap();

        let source = Arc::new(
            ScriptedSource::new()
                .serve("u1", b"%PDF-1")
                .serve("u3b", b"%PDF-3"),
        );
        let harvester = Harvester::new(config.clone(), source.clone());

        let summary = harvester.run().await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.bytes_written, 12);

        let status = table::read_status_table(&config.input.status, &config.columns)
            .unwrap()
            .unwrap();
        assert_eq!(status.len(), 3);
        assert_eq!(status.status_of("1"), Some(FetchStatus::Success));
        assert_eq!(status.status_of("2"), Some(FetchStatus::Failure));
        assert_eq!(status.status_of("3"), Some(FetchStatus::Success));

        assert_eq!(pdf_names(&config.output.destination), vec!["1.pdf", "3.pdf"]);

        let calls = source.calls();
        let u3 = calls.iter().position(|c| c == "u3").unwrap();
        let u3b = calls.iter().position(|c| c == "u3b").unwrap();
        assert!(u3 < u3b);
    }

    #[tokio::test]
    async fn test_resume_skips_previous_successes() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 2);
        fs::write(
            &config.input.source,
            "BRnum,Pdf_URL,Report Html Address\nX,ux,\nY,uy,\n",
        )
        .unwrap();
        fs::write(&config.input.status, "BRnum,pdf_downloaded\nX,yes\nY,no\n").unwrap();

        let source = Arc::new(ScriptedSource::new().serve("uy", b"%PDF"));
        let harvester = Harvester::new(config.clone(), source.clone());

        let summary = harvester.run().await.unwrap();

        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.carried_over, 1);
        assert_eq!(source.calls(), vec!["uy"]);

        let status = table::read_status_table(&config.input.status, &config.columns)
            .unwrap()
            .unwrap();
        assert_eq!(status.len(), 2);
        assert_eq!(status.status_of("X"), Some(FetchStatus::Success));
        assert_eq!(status.status_of("Y"), Some(FetchStatus::Success));
    }

    #[tokio::test]
    async fn test_empty_candidate_set_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 4);
        fs::write(&config.input.source, "BRnum,Pdf_URL,Report Html Address\nA,ua,\n").unwrap();
        let status_before = "BRnum,pdf_downloaded\nA,yes\n";
        fs::write(&config.input.status, status_before).unwrap();

        let source = Arc::new(ScriptedSource::new());
        let harvester = Harvester::new(config.clone(), source.clone());

        let summary = harvester.run().await.unwrap();

        assert!(summary.skipped);
        assert_eq!(summary.attempted, 0);
        assert!(source.calls().is_empty());
        assert!(!config.output.destination.exists());
        assert_eq!(fs::read_to_string(&config.input.status).unwrap(), status_before);
    }

    #[tokio::test]
    async fn test_cancelled_run_still_writes_status() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 2);
        fs::write(
            &config.input.source,
            "BRnum,Pdf_URL,Report Html Address\nA,ua,\nB,ub,\n",
        )
        .unwrap();

        let source = Arc::new(ScriptedSource::new().serve("ua", b"%PDF"));
        let harvester = Harvester::new(config.clone(), source.clone());
        harvester.cancel_flag().cancel();

        let summary = harvester.run().await.unwrap();

        assert_eq!(summary.failed, 2);
        assert!(source.calls().is_empty());
        let status = table::read_status_table(&config.input.status, &config.columns)
            .unwrap()
            .unwrap();
        assert_eq!(status.status_of("A"), Some(FetchStatus::Failure));
    }

    #[tokio::test]
    async fn test_missing_source_list_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir, 1);

        let harvester = Harvester::new(config, Arc::new(ScriptedSource::new()));
        let result = harvester.run().await;

        assert!(matches!(result, Err(HarvestError::Table(TableError::Read { .. }))));
    }
}
