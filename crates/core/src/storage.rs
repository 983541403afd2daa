//! Upload naming and validation.
//!
//! Uploads live in two buckets, each a directory under the configured upload
//! root and served at `/uploads/{bucket}/{key}`. This module only decides
//! names and checks content; the binaries do the file I/O.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::OrderId;

/// Default cap on an uploaded file (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix uploads are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A storage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Product and outlet pictures.
    Images,
    /// Bank-transfer screenshots uploaded by customers.
    PaymentProofs,
}

impl Bucket {
    /// Directory name under the upload root.
    #[must_use]
    pub const fn dir(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::PaymentProofs => "payment-proofs",
        }
    }
}

/// Folder inside the images bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFolder {
    Products,
    Outlets,
}

impl ImageFolder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Outlets => "outlets",
        }
    }
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    /// Match a `Content-Type` header value.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// Why an upload was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("no file was uploaded")]
    Empty,
    #[error("unsupported file type {0}; upload a JPEG, PNG, WebP or GIF image")]
    UnsupportedType(String),
    #[error("file is too large (maximum {max_bytes} bytes)")]
    TooLarge { max_bytes: usize },
}

/// Check an upload's declared type and size.
///
/// # Errors
///
/// Returns [`UploadError`] for an empty body, a non-image content type, or a
/// body larger than `max_bytes`.
pub fn validate_image(
    content_type: Option<&str>,
    len: usize,
    max_bytes: usize,
) -> Result<ImageKind, UploadError> {
    if len == 0 {
        return Err(UploadError::Empty);
    }
    let content_type = content_type.unwrap_or("application/octet-stream");
    let kind = ImageKind::from_content_type(content_type)
        .ok_or_else(|| UploadError::UnsupportedType(content_type.to_owned()))?;
    if len > max_bytes {
        return Err(UploadError::TooLarge { max_bytes });
    }
    Ok(kind)
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub bucket: Bucket,
    pub key: String,
}

impl ObjectKey {
    /// Payment proof: `{order_id}_{unix_millis}.{ext}`.
    #[must_use]
    pub fn payment_proof(order_id: OrderId, kind: ImageKind, now: DateTime<Utc>) -> Self {
        Self {
            bucket: Bucket::PaymentProofs,
            key: format!(
                "{order_id}_{millis}.{ext}",
                millis = now.timestamp_millis(),
                ext = kind.extension()
            ),
        }
    }

    /// Catalog image: `{folder}/{uuid}.{ext}`.
    #[must_use]
    pub fn image(folder: ImageFolder, kind: ImageKind) -> Self {
        Self {
            bucket: Bucket::Images,
            key: format!(
                "{}/{}.{}",
                folder.as_str(),
                Uuid::new_v4(),
                kind.extension()
            ),
        }
    }

    /// Path relative to the upload root.
    #[must_use]
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.bucket.dir(), self.key)
    }

    /// URL the file is served at.
    #[must_use]
    pub fn public_url(&self) -> String {
        format!("{PUBLIC_PREFIX}/{}", self.relative_path())
    }
}
