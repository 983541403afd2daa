//! Cooskie Core - Shared domain library.
//!
//! This crate provides the types and rules shared by every Cooskie component:
//! - `storefront` - Public bakery storefront (catalog, cart, checkout, tracking)
//! - `admin` - Back-office for products, outlets, orders and payment proofs
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains types and pure functions plus the environment
//! readers both binaries configure themselves with - no database access, no
//! HTTP. Both binaries lean on it for the order lifecycle so the
//! storefront and the back-office can never disagree about what a status means.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, contact fields and status enums
//! - [`cart`] - Visitor cart, favorites and order-history lists
//! - [`checkout`] - Checkout validation and order construction
//! - [`order`] - Order status state machine
//! - [`payment`] - Payment proof rules
//! - [`tracking`] - Tracking code generation and parsing
//! - [`review`] - Review validation and rating aggregation
//! - [`catalog`] - Slug helpers for products
//! - [`storage`] - Upload buckets, validation and object naming
//! - [`env`] - Environment variable readers and secret checks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod env;
pub mod order;
pub mod payment;
pub mod review;
pub mod storage;
pub mod tracking;
pub mod types;

pub use types::*;
