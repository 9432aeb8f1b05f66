//! Decides what to download this run and folds the results back into history
//!
//! Works purely on in-memory rows; reading and writing the spreadsheets is
//! the job of [`crate::table`].

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::{CandidateRow, FetchOutcome, StatusTable};

/// Result of reconciling the candidate list against the previous status table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Identifiers to attempt, unique, in source order
    pub candidates: Vec<CandidateRow>,
    /// Successful rows from the previous run, carried forward unchanged
    pub prior_successes: StatusTable,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Remove every identifier already marked successful (anti-join on identifier).
///
/// Duplicate identifiers in `source` keep their first occurrence only.
pub fn load_candidates(source: Vec<CandidateRow>, prior_status: Option<&StatusTable>) -> Plan {
    let prior_successes = prior_status
        .map(StatusTable::successes)
        .unwrap_or_default();

    let done: HashSet<&str> = prior_successes
        .rows
        .iter()
        .map(|row| row.identifier.as_str())
        .collect();

    let total = source.len();
    let mut seen = HashSet::with_capacity(total);
    let mut candidates = Vec::with_capacity(total);

    for row in source {
        if done.contains(row.identifier.as_str()) {
            continue;
        }
        if !seen.insert(row.identifier.clone()) {
            warn!(identifier = %row.identifier, "Duplicate identifier in candidate list, keeping first row");
            continue;
        }
        candidates.push(row);
    }

    debug!(
        total,
        already_downloaded = done.len(),
        candidates = candidates.len(),
        "Candidate list reconciled"
    );

    Plan {
        candidates,
        prior_successes,
    }
}

/// New outcomes followed by the carried-over prior successes
pub fn merge(new_outcomes: Vec<FetchOutcome>, prior_successes: StatusTable) -> StatusTable {
    if prior_successes.is_empty() {
        return StatusTable::new(new_outcomes);
    }

    let mut rows = new_outcomes;
    rows.extend(prior_successes.rows);
    StatusTable::new(rows)
}
