//! Local-disk upload storage.
//!
//! Files land under `{upload_dir}/{bucket}/{key}` and are served by the
//! `/uploads` static route.

use std::path::{Path, PathBuf};

use cooskie_core::storage::{ImageKind, ObjectKey, UploadError, validate_image};

/// Errors from storing an upload.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The file failed validation.
    #[error(transparent)]
    Rejected(#[from] UploadError),

    /// Writing to disk failed.
    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes validated images into bucket directories.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    #[must_use]
    pub const fn new(root: PathBuf, max_bytes: usize) -> Self {
        Self { root, max_bytes }
    }

    /// Upload root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate `bytes` as an image and write it under the key `name` picks.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Rejected` if the file is empty, too large or not
    /// an accepted image type, and `StorageError::Io` if the write fails.
    pub async fn put_image(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
        name: impl FnOnce(ImageKind) -> ObjectKey,
    ) -> Result<ObjectKey, StorageError> {
        let kind = validate_image(content_type, bytes.len(), self.max_bytes)?;
        let key = name(kind);
        let path = self.root.join(key.relative_path());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(key)
    }
}
