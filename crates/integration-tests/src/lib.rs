//! Integration tests for Cooskie.
//!
//! # Running Tests
//!
//! ```bash
//! # Domain tests, no services needed
//! cargo test -p cooskie-integration-tests
//!
//! # HTTP flows against running servers with a migrated, seeded database
//! ck-cli migrate && ck-cli seed catalog
//! cargo test -p cooskie-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `order_lifecycle` - status machine and payment review across core and admin
//! - `checkout` - cart, checkout validation and order construction
//! - `http_flows` - storefront and back-office over HTTP (`#[ignore]`)
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `TEST_ADMIN_EMAIL`, `TEST_ADMIN_PASSWORD` - a login created with `ck-cli admin create`

#![cfg_attr(not(test), forbid(unsafe_code))]

use cooskie_core::cart::ProductSnapshot;
use cooskie_core::{Price, ProductCategory, ProductId};

/// Storefront URL without a trailing slash.
#[must_use]
pub fn storefront_base_url() -> String {
    base_url("STOREFRONT_BASE_URL", "http://localhost:3000")
}

/// Back-office URL without a trailing slash.
#[must_use]
pub fn admin_base_url() -> String {
    base_url("ADMIN_BASE_URL", "http://localhost:3001")
}

fn base_url(key: &str, default: &str) -> String {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// A client that keeps cookies and does not follow redirects, so tests can
/// assert on `Location`.
///
/// # Errors
///
/// Returns `reqwest::Error` if the client cannot be built.
pub fn browser() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// A cart snapshot for product `id` at `rupiah`.
#[must_use]
pub fn snapshot(id: i32, name: &str, rupiah: i64) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: name.to_string(),
        slug: cooskie_core::catalog::slugify(name),
        price: Price::from_rupiah(rupiah),
        image_url: None,
        category: ProductCategory::Cookies,
    }
}
