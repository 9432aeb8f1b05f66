//! Core data types shared by the reconciler, queue, workers and tables

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Literal written to the status table for a successful download
pub const STATUS_YES: &str = "yes";
/// Literal written to the status table for a failed download
pub const STATUS_NO: &str = "no";

/// Result of one download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    Success,
    Failure,
}

impl FetchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Success => STATUS_YES,
            FetchStatus::Failure => STATUS_NO,
        }
    }
}

impl From<bool> for FetchStatus {
    fn from(success: bool) -> Self {
        if success {
            FetchStatus::Success
        } else {
            FetchStatus::Failure
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown status value: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for FetchStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case(STATUS_YES) {
            Ok(FetchStatus::Success)
        } else if value.eq_ignore_ascii_case(STATUS_NO) {
            Ok(FetchStatus::Failure)
        } else {
            Err(UnknownStatus(value.to_string()))
        }
    }
}

/// One row of the candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    pub identifier: String,
    pub primary_url: Option<String>,
    pub fallback_url: Option<String>,
}

impl CandidateRow {
    pub fn new(
        identifier: impl Into<String>,
        primary_url: Option<&str>,
        fallback_url: Option<&str>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            primary_url: primary_url.map(str::to_string),
            fallback_url: fallback_url.map(str::to_string),
        }
    }
}

/// Unit of work consumed by exactly one worker
///
/// Immutable once enqueued. `storage_key` is the file name inside the run's
/// destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub identifier: String,
    pub primary_url: Option<String>,
    pub fallback_url: Option<String>,
    pub storage_key: String,
}

/// Outcome recorded for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub identifier: String,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn new(identifier: impl Into<String>, status: FetchStatus) -> Self {
        Self {
            identifier: identifier.into(),
            status,
        }
    }

    pub fn failure(identifier: impl Into<String>) -> Self {
        Self::new(identifier, FetchStatus::Failure)
    }
}

/// Persisted identifier -> status row
pub type StatusRow = FetchOutcome;

/// Status table as read from / written to the status spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    pub rows: Vec<StatusRow>,
}

impl StatusTable {
    pub fn new(rows: Vec<StatusRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows marked successful, in table order
    pub fn successes(&self) -> StatusTable {
        StatusTable {
            rows: self
                .rows
                .iter()
                .filter(|row| row.status.is_success())
                .cloned()
                .collect(),
        }
    }

    pub fn status_of(&self, identifier: &str) -> Option<FetchStatus> {
        self.rows
            .iter()
            .find(|row| row.identifier == identifier)
            .map(|row| row.status)
    }
}

impl From<Vec<FetchOutcome>> for StatusTable {
    fn from(rows: Vec<FetchOutcome>) -> Self {
        Self { rows }
    }
}
