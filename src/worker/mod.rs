//! Download workers
//!
//! A fixed number of tokio tasks pull [`DownloadTask`](crate::models::DownloadTask)s
//! from the shared [`WorkQueue`](crate::queue::WorkQueue), fetch each report
//! (primary URL, then fallback), store it and record one outcome per task in
//! the [`OutcomeLedger`](crate::ledger::OutcomeLedger).

pub mod fetcher;
pub mod http;
pub mod pool;
pub mod runner;

pub use fetcher::Fetcher;
pub use http::{DownloadError, HttpClient, PdfSource};
pub use pool::{CancelFlag, WorkerPool};
