//! Local-disk storage for catalog images and proof cleanup.
//!
//! Shares the upload root with the storefront, which writes payment proofs
//! there. Files are served by the `/uploads` static route of both binaries.

use std::path::{Component, Path, PathBuf};

use cooskie_core::storage::{ImageFolder, ObjectKey, PUBLIC_PREFIX, UploadError, validate_image};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The file failed validation.
    #[error(transparent)]
    Rejected(#[from] UploadError),

    /// The URL does not point inside the upload root.
    #[error("not an upload URL: {0}")]
    ForeignUrl(String),

    #[error("upload storage failed: {0}")]
    Io(#[from] std::io::Error),
}

/// An image file taken from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

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

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store a product or outlet picture and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Rejected` for an empty, oversized or non-image
    /// file and `StorageError::Io` if the write fails.
    pub async fn put_image(
        &self,
        folder: ImageFolder,
        upload: &ImageUpload,
    ) -> Result<String, StorageError> {
        let kind = validate_image(
            upload.content_type.as_deref(),
            upload.bytes.len(),
            self.max_bytes,
        )?;
        let key = ObjectKey::image(folder, kind);
        let path = self.root.join(key.relative_path());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!(path = %path.display(), size = upload.bytes.len(), "Stored image");
        Ok(key.public_url())
    }

    /// Delete the file behind an `/uploads/...` URL. A file that is already
    /// gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ForeignUrl` for URLs outside the upload root and
    /// `StorageError::Io` if the delete fails.
    pub async fn remove(&self, public_url: &str) -> Result<(), StorageError> {
        let path = self.resolve(public_url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a file, logging rather than failing. Used after the database
    /// change that orphaned it has already committed.
    pub async fn remove_quietly(&self, public_url: &str) {
        if let Err(e) = self.remove(public_url).await {
            tracing::warn!(url = public_url, error = %e, "Failed to remove upload");
        }
    }

    fn resolve(&self, public_url: &str) -> Result<PathBuf, StorageError> {
        let foreign = || StorageError::ForeignUrl(public_url.to_owned());

        let relative = public_url
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(foreign)?;
        let relative = Path::new(relative);
        if relative.as_os_str().is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(foreign());
        }
        Ok(self.root.join(relative))
    }
}
