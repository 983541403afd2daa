//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `client_state` - Cart, favorites and order history in the visitor session
//! - `orders` - Checkout and payment-proof upload
//! - `storage` - Writing uploaded files under the upload root

pub mod client_state;
pub mod orders;
pub mod storage;

pub use orders::{OrderError, OrderService};
pub use storage::{StorageError, UploadStore};
