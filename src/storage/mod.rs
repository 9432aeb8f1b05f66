//! Destination storage for downloaded reports
//! Uses Apache Arrow object_store crate

use object_store::{ObjectStore, local::LocalFileSystem, path::Path as StoragePath};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Cannot open destination {path}: {source}")]
    Destination {
        path: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub size: usize,
}

/// Storage client wrapping object_store
///
/// The local backend stages each object in a temporary file and renames it
/// into place, so a failed write never leaves a partial report behind.
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Storage rooted at an existing local directory
    pub fn local(root: &Path) -> Result<Self> {
        let store =
            LocalFileSystem::new_with_prefix(root).map_err(|source| StorageError::Destination {
                path: root.display().to_string(),
                source,
            })?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Create in-memory storage for testing
    pub fn in_memory() -> Self {
        Self::new(Arc::new(object_store::memory::InMemory::new()))
    }

    /// Write bytes under `key`, replacing any existing object
    pub async fn upload(&self, key: &str, data: bytes::Bytes) -> Result<UploadMetadata> {
        let path = parse_key(key)?;
        let size = data.len();

        self.store.put(&path, data.into()).await?;

        tracing::debug!(key, size, "Stored report");

        Ok(UploadMetadata {
            key: key.to_string(),
            size,
        })
    }

    /// Read an object back
    pub async fn download(&self, key: &str) -> Result<bytes::Bytes> {
        let path = parse_key(key)?;
        let result = self.store.get(&path).await?;
        Ok(result.bytes().await?)
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = parse_key(key)?;

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys are single file names; anything that would nest or escape the root is rejected
fn parse_key(key: &str) -> Result<StoragePath> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    StoragePath::parse(key).map_err(|_| StorageError::InvalidKey(key.to_string()))
}
