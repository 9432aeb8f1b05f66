//! HTTP client for retrieving PDF reports

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

use crate::config::HttpConfig;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Response has no content-type header")]
    MissingContentType,

    #[error("Response is not a PDF (content-type: {0})")]
    NotPdf(String),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Something that can hand back the bytes of a PDF behind a URL
///
/// Any failure, including a response that is not a PDF, is an `Err`.
#[async_trait]
pub trait PdfSource: Send + Sync {
    async fn fetch_pdf(&self, url: &str) -> Result<Bytes>;
}

/// True when a content-type header value marks a PDF
pub fn is_pdf_content_type(value: &str) -> bool {
    value
        .to_ascii_lowercase()
        .contains(mime::APPLICATION_PDF.essence_str())
}

/// reqwest-backed PDF downloader
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| DownloadError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    fn classify(err: reqwest::Error) -> DownloadError {
        if err.is_timeout() {
            DownloadError::Timeout
        } else if err.is_redirect() {
            DownloadError::TooManyRedirects
        } else if err.is_builder() {
            DownloadError::InvalidUrl(err.to_string())
        } else {
            DownloadError::RequestFailed(err.to_string())
        }
    }
}

#[async_trait]
impl PdfSource for HttpClient {
    /// Single GET; the body is only read once the content-type says PDF
    async fn fetch_pdf(&self, url: &str) -> Result<Bytes> {
        debug!(url, "Starting download");

        let response = self.client.get(url).send().await.map_err(Self::classify)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .ok_or(DownloadError::MissingContentType)?
            .to_str()
            .map_err(|_| DownloadError::NotPdf("<non-ascii>".to_string()))?;

        if !is_pdf_content_type(content_type) {
            return Err(DownloadError::NotPdf(content_type.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| match Self::classify(e) {
                DownloadError::RequestFailed(msg) => {
                    DownloadError::RequestFailed(format!("Failed to read body: {}", msg))
                }
                other => other,
            })?;

        debug!(url, size = bytes.len(), "Download completed");

        Ok(bytes)
    }
}
