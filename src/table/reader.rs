use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

use super::{Result, TableError};
use crate::config::ColumnConfig;
use crate::models::{CandidateRow, FetchOutcome, FetchStatus, StatusTable};

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn column_index(headers: &StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| TableError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

/// Blank and whitespace-only cells count as absent
fn cell(record: &StringRecord, index: usize) -> Option<&str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Read the candidate list; rows without an identifier are skipped
pub fn read_candidates(path: &Path, columns: &ColumnConfig) -> Result<Vec<CandidateRow>> {
    let mut reader = open(path)?;
    let read_err = |source| TableError::Read {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(read_err)?.clone();
    let id_idx = column_index(&headers, &columns.identifier, path)?;
    let primary_idx = column_index(&headers, &columns.primary_url, path)?;
    let fallback_idx = column_index(&headers, &columns.fallback_url, path)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(read_err)?;

        let Some(identifier) = cell(&record, id_idx) else {
            warn!(row = line + 1, path = %path.display(), "Row without identifier skipped");
            continue;
        };

        rows.push(CandidateRow::new(
            identifier,
            cell(&record, primary_idx),
            cell(&record, fallback_idx),
        ));
    }

    info!(path = %path.display(), rows = rows.len(), "Candidate list loaded");
    Ok(rows)
}

/// Read the previous run's status table, `None` when the file does not exist
pub fn read_status_table(path: &Path, columns: &ColumnConfig) -> Result<Option<StatusTable>> {
    if !path.exists() {
        info!(path = %path.display(), "No previous status table, starting fresh");
        return Ok(None);
    }

    let mut reader = open(path)?;
    let read_err = |source| TableError::Read {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(read_err)?.clone();
    let id_idx = column_index(&headers, &columns.identifier, path)?;
    let status_idx = column_index(&headers, &columns.status, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;

        let Some(identifier) = cell(&record, id_idx) else {
            continue;
        };

        let raw = cell(&record, status_idx).unwrap_or_default();
        let status = raw.parse::<FetchStatus>().unwrap_or_else(|e| {
            warn!(identifier, error = %e, "Unrecognised status, will retry");
            FetchStatus::Failure
        });

        rows.push(FetchOutcome::new(identifier, status));
    }

    info!(path = %path.display(), rows = rows.len(), "Status table loaded");
    Ok(Some(StatusTable::new(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.csv");
        fs::write(
            &path,
            "BRnum,Company,Pdf_URL,Report Html Address\n\
             BR1,Acme,http://a/1.pdf,\n\
             BR2,Beta,,  \n\
             ,Orphan,http://x,\n\
             BR3,Gamma,http://a/3.pdf,http://b/3.pdf\n",
        )
        .unwrap();

        let rows = read_candidates(&path, &ColumnConfig::default()).unwrap();

        assert_eq!(
            rows,
            vec![
                CandidateRow::new("BR1", Some("http://a/1.pdf"), None),
                CandidateRow::new("BR2", None, None),
                CandidateRow::new("BR3", Some("http://a/3.pdf"), Some("http://b/3.pdf")),
            ]
        );
    }

    #[test]
    fn test_missing_column_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.csv");
        fs::write(&path, "BRnum,Pdf_URL\nBR1,http://a\n").unwrap();

        let result = read_candidates(&path, &ColumnConfig::default());
        assert!(matches!(
            result,
            Err(TableError::MissingColumn { column, .. }) if column == "Report Html Address"
        ));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_candidates(&temp_dir.path().join("nope.csv"), &ColumnConfig::default());
        assert!(matches!(result, Err(TableError::Read { .. })));
    }

    #[test]
    fn test_missing_status_table_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let result =
            read_status_table(&temp_dir.path().join("status.csv"), &ColumnConfig::default());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_read_status_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("status.csv");
        fs::write(
            &path,
            "BRnum,pdf_downloaded\nBR1,yes\nBR2,no\nBR3,pending\n",
        )
        .unwrap();

        let table = read_status_table(&path, &ColumnConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.status_of("BR1"), Some(FetchStatus::Success));
        assert_eq!(table.status_of("BR2"), Some(FetchStatus::Failure));
        assert_eq!(table.status_of("BR3"), Some(FetchStatus::Failure));
    }
}
