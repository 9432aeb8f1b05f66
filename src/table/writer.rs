use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;

use super::{Result, TableError};
use crate::config::ColumnConfig;
use crate::models::StatusTable;

/// Sibling path the table is staged in before the rename
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_rows(path: &Path, table: &StatusTable, columns: &ColumnConfig) -> io::Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([columns.identifier.as_str(), columns.status.as_str()])?;
    for row in &table.rows {
        writer.write_record([row.identifier.as_str(), row.status.as_str()])?;
    }
    writer.flush()
}

/// Replace the status table at `path` with `table`
///
/// The rows are written to a staging file first and renamed over the target,
/// so readers see either the old table or the complete new one.
pub fn write_status_table(path: &Path, table: &StatusTable, columns: &ColumnConfig) -> Result<()> {
    let write_err = |source| TableError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let staging = staging_path(path);
    if let Err(e) = write_rows(&staging, table, columns) {
        let _ = fs::remove_file(&staging);
        return Err(write_err(e));
    }

    fs::rename(&staging, path).map_err(write_err)?;

    info!(path = %path.display(), rows = table.len(), "Status table written");
    Ok(())
}
