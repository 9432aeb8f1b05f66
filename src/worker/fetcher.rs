//! Single-item fetcher: primary URL, one fallback, PDF check, atomic write

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::http::PdfSource;
use crate::models::FetchStatus;
use crate::observability::Metrics;
use crate::storage::StorageClient;

/// Fetches one report and writes it to storage
///
/// Never returns an error: every transport, content-type and storage problem
/// is logged and folded into [`FetchStatus::Failure`].
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn PdfSource>,
    storage: StorageClient,
    metrics: Arc<Metrics>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn PdfSource>, storage: StorageClient, metrics: Arc<Metrics>) -> Self {
        Self {
            source,
            storage,
            metrics,
        }
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// Try `primary_url`, then `fallback_url`, and persist the first PDF under `key`
    pub async fn fetch(
        &self,
        primary_url: Option<&str>,
        fallback_url: Option<&str>,
        key: &str,
    ) -> FetchStatus {
        if primary_url.is_none() && fallback_url.is_none() {
            debug!(key, "No URL to try");
            return FetchStatus::Failure;
        }

        let mut body = match primary_url {
            Some(url) => self.attempt(url).await,
            None => None,
        };

        if body.is_none() {
            if let Some(url) = fallback_url {
                body = self.attempt(url).await;
                if body.is_some() {
                    self.metrics.fallback_used();
                }
            }
        }

        let Some(bytes) = body else {
            return FetchStatus::Failure;
        };

        match self.storage.upload(key, bytes).await {
            Ok(meta) => {
                self.metrics.bytes_written(meta.size as u64);
                FetchStatus::Success
            }
            Err(e) => {
                warn!(key, error = %e, "Retrieved PDF could not be written");
                FetchStatus::Failure
            }
        }
    }

    async fn attempt(&self, url: &str) -> Option<Bytes> {
        match self.source.fetch_pdf(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(url, error = %e, "Retrieval failed");
                None
            }
        }
    }
}
