//! Domain models for the storefront.
//!
//! These are read models assembled by the repositories in [`crate::db`];
//! visitor-local lists (cart, favorites, order history) live in
//! `cooskie_core::cart`.

pub mod order;
pub mod outlet;
pub mod product;
pub mod review;

pub use order::{PaymentProof, TrackedItem, TrackedOrder};
pub use outlet::Outlet;
pub use product::Product;
pub use review::Review;
