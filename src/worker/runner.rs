//! Task runner - turns one DownloadTask into exactly one FetchOutcome

use super::fetcher::Fetcher;
use crate::models::{CandidateRow, DownloadTask, FetchOutcome};
use crate::queue::TaskEnvelope;
use tracing::{info, warn};

/// File extension used for stored reports
pub const REPORT_EXTENSION: &str = "pdf";

/// Storage key for a report: `<identifier>.pdf`
pub fn report_key(identifier: &str) -> String {
    format!("{}.{}", identifier, REPORT_EXTENSION)
}

/// Build the task for one candidate row
pub fn build_task(row: CandidateRow) -> DownloadTask {
    let storage_key = report_key(&row.identifier);
    DownloadTask {
        identifier: row.identifier,
        primary_url: row.primary_url,
        fallback_url: row.fallback_url,
        storage_key,
    }
}

/// Process a single download task
pub async fn process_task(envelope: &TaskEnvelope, fetcher: &Fetcher) -> FetchOutcome {
    let task = &envelope.task;

    let status = fetcher
        .fetch(
            task.primary_url.as_deref(),
            task.fallback_url.as_deref(),
            &task.storage_key,
        )
        .await;

    if status.is_success() {
        info!(seq = envelope.seq, identifier = %task.identifier, key = %task.storage_key, "Report downloaded");
    } else {
        warn!(
            seq = envelope.seq,
            identifier = %task.identifier,
            primary_url = task.primary_url.as_deref().unwrap_or("-"),
            fallback_url = task.fallback_url.as_deref().unwrap_or("-"),
            "Report download failed"
        );
    }

    FetchOutcome::new(task.identifier.clone(), status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchStatus;
    use crate::observability::Metrics;
    use crate::storage::StorageClient;
    use crate::worker::fetcher::tests::ScriptedSource;
    use std::sync::Arc;

    #[test]
    fn test_report_key() {
        assert_eq!(report_key("BR-1001"), "BR-1001.pdf");
    }

    #[test]
    fn test_build_task() {
        let task = build_task(CandidateRow::new("7", Some("http://a"), None));

        assert_eq!(task.identifier, "7");
        assert_eq!(task.primary_url.as_deref(), Some("http://a"));
        assert_eq!(task.fallback_url, None);
        assert_eq!(task.storage_key, "7.pdf");
    }

    #[tokio::test]
    async fn test_process_task_maps_status() {
        let source = Arc::new(ScriptedSource::new().serve("ok", b"%PDF"));
        let fetcher = Fetcher::new(source, StorageClient::in_memory(), Arc::new(Metrics::new()));

        let good = TaskEnvelope {
            seq: 0,
            task: build_task(CandidateRow::new("1", Some("ok"), None)),
        };
        let bad = TaskEnvelope {
            seq: 1,
            task: build_task(CandidateRow::new("2", Some("broken"), None)),
        };

        assert_eq!(
            process_task(&good, &fetcher).await,
            FetchOutcome::new("1", FetchStatus::Success)
        );
        assert_eq!(
            process_task(&bad, &fetcher).await,
            FetchOutcome::new("2", FetchStatus::Failure)
        );
    }
}
