use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Spreadsheets read at the start of a run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Candidate list with identifier and URL columns
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Status table from the previous run, rewritten at the end of this one
    #[serde(default = "default_status")]
    pub status: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            status: default_status(),
        }
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("customer_data/GRI_2017_2020.csv")
}

fn default_status() -> PathBuf {
    PathBuf::from("customer_data/Metadata2017_2020.csv")
}

/// Where downloaded reports land
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
        }
    }
}

fn default_destination() -> PathBuf {
    PathBuf::from("files")
}

/// Spreadsheet header names
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnConfig {
    #[serde(default = "default_identifier_column")]
    pub identifier: String,
    #[serde(default = "default_primary_url_column")]
    pub primary_url: String,
    #[serde(default = "default_fallback_url_column")]
    pub fallback_url: String,
    /// Status column of the status table
    #[serde(default = "default_status_column")]
    pub status: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            identifier: default_identifier_column(),
            primary_url: default_primary_url_column(),
            fallback_url: default_fallback_url_column(),
            status: default_status_column(),
        }
    }
}

fn default_identifier_column() -> String {
    "BRnum".to_string()
}

fn default_primary_url_column() -> String {
    "Pdf_URL".to_string()
}

fn default_fallback_url_column() -> String {
    "Report Html Address".to_string()
}

fn default_status_column() -> String {
    "pdf_downloaded".to_string()
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Upper bound on concurrent downloads
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
        }
    }
}

impl WorkerConfig {
    /// Number of workers to spawn for `candidates` tasks
    pub fn effective_pool_size(&self, candidates: usize) -> usize {
        self.pool_size.min(candidates).max(1)
    }
}

fn default_pool_size() -> usize {
    10
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("pdfharvest/{}", env!("CARGO_PKG_VERSION"))
}
