//! Business logic services for the back-office.
//!
//! # Services
//!
//! - `auth` - Email and password login for admins
//! - `orders` - Status buttons and payment review
//! - `storage` - Catalog images and upload cleanup

pub mod auth;
pub mod orders;
pub mod storage;

pub use auth::{AuthError, AuthService};
pub use orders::{OrderAdminError, OrderAdminService};
pub use storage::{ImageUpload, StorageError, UploadStore};
