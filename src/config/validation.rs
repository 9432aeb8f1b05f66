use super::models::Config;
use thiserror::Error;

/// Hard ceiling on concurrent workers
pub const MAX_POOL_SIZE: usize = 256;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("worker.pool_size must be between 1 and {max}, got {value}")]
    InvalidPoolSize { value: usize, max: usize },

    #[error("HTTP timeout must be positive: {field} = {value}")]
    InvalidTimeout { field: String, value: u64 },

    #[error("Column name for '{field}' is empty")]
    EmptyColumnName { field: String },

    #[error("Columns '{first}' and '{second}' use the same header '{header}'")]
    DuplicateColumn {
        first: String,
        second: String,
        header: String,
    },

    #[error("Source list and status table point to the same file: {path}")]
    SameInputFiles { path: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_worker(config)?;
    validate_http(config)?;
    validate_columns(config)?;
    validate_paths(config)?;
    Ok(())
}

fn validate_worker(config: &Config) -> Result<(), ValidationError> {
    let pool_size = config.worker.pool_size;
    if pool_size == 0 || pool_size > MAX_POOL_SIZE {
        return Err(ValidationError::InvalidPoolSize {
            value: pool_size,
            max: MAX_POOL_SIZE,
        });
    }
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    let timeouts = [
        ("request_timeout_secs", config.http.request_timeout_secs),
        ("connect_timeout_secs", config.http.connect_timeout_secs),
    ];

    for (field, value) in timeouts {
        if value == 0 {
            return Err(ValidationError::InvalidTimeout {
                field: field.to_string(),
                value,
            });
        }
    }
    Ok(())
}

/// Candidate columns must be distinct; the status column lives in its own
/// table and only has to differ from the identifier column.
fn validate_columns(config: &Config) -> Result<(), ValidationError> {
    let columns = &config.columns;
    let candidate_columns = [
        ("identifier", &columns.identifier),
        ("primary_url", &columns.primary_url),
        ("fallback_url", &columns.fallback_url),
    ];

    for (field, header) in candidate_columns.iter().chain([("status", &columns.status)].iter()) {
        if header.trim().is_empty() {
            return Err(ValidationError::EmptyColumnName {
                field: field.to_string(),
            });
        }
    }

    for (i, (first, a)) in candidate_columns.iter().enumerate() {
        for (second, b) in &candidate_columns[i + 1..] {
            if a == b {
                return Err(ValidationError::DuplicateColumn {
                    first: first.to_string(),
                    second: second.to_string(),
                    header: a.to_string(),
                });
            }
        }
    }

    if columns.status == columns.identifier {
        return Err(ValidationError::DuplicateColumn {
            first: "identifier".to_string(),
            second: "status".to_string(),
            header: columns.status.clone(),
        });
    }

    Ok(())
}

fn validate_paths(config: &Config) -> Result<(), ValidationError> {
    if config.input.source == config.input.status {
        return Err(ValidationError::SameInputFiles {
            path: config.input.source.display().to_string(),
        });
    }
    Ok(())
}
