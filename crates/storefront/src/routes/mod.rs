//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page (newest products)
//! GET  /about                         - About page
//! GET  /outlets                       - Outlet list with map links
//!
//! # Catalog
//! GET  /products                      - Catalog (?category=, ?q=)
//! GET  /products/{slug}               - Product detail with reviews
//! POST /products/{slug}/reviews       - Post a guest review
//!
//! # Cart and favorites (session-backed)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add one unit of a product
//! POST /cart/update                   - Change a line quantity by a delta
//! POST /cart/remove                   - Remove a line
//! POST /cart/clear                    - Empty the cart
//! GET  /favorites                     - Favorites page
//! POST /favorites/toggle              - Add or remove a favorite
//!
//! # Checkout and tracking
//! GET  /checkout                      - Checkout form
//! POST /checkout                      - Place the order
//! GET  /tracking                      - Lookup form and order history
//! GET  /tracking/{code}               - Order status
//! POST /tracking/{code}/payment       - Upload a transfer proof
//! ```

pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod pages;
pub mod products;
pub mod tracking;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::Handler,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::middleware::{cart_rate_limiter, write_rate_limiter};
use crate::services::client_state;
use crate::state::AppState;

/// Room for multipart boundaries and the other form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Header badges shown on every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nav {
    pub cart_count: u32,
    pub favorites_count: usize,
}

impl Nav {
    /// Read the badge counts from the visitor's session.
    pub async fn load(session: &Session) -> Self {
        Self {
            cart_count: client_state::load_cart(session).await.count(),
            favorites_count: client_state::load_favorites(session).await.len(),
        }
    }
}

/// One-shot message carried on a redirect's query string.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub notice: Option<String>,
}

fn with_message(path: &str, key: &str, message: &str) -> String {
    let path = path.split('#').next().unwrap_or(path);
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}{key}={}", urlencoding::encode(message))
}

/// Redirect to `path` with an `error` message in the query string.
pub fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_message(path, "error", message))
}

/// Redirect to `path` with a `notice` message in the query string.
pub fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_message(path, "notice", message))
}

/// Local path to return to after a form post, or `fallback`.
///
/// Only same-site absolute paths are accepted.
#[must_use]
pub fn return_path<'a>(requested: Option<&'a str>, fallback: &'a str) -> &'a str {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => fallback,
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route(
            "/{slug}/reviews",
            post(products::create_review).layer(write_rate_limiter()),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .layer(cart_rate_limiter())
        .route("/", get(cart::show))
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(favorites::toggle))
        .layer(cart_rate_limiter())
        .route("/", get(favorites::index))
}

/// Create the tracking routes router.
pub fn tracking_routes(max_upload_bytes: usize) -> Router<AppState> {
    let body_limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    Router::new()
        .route("/", get(tracking::lookup))
        .route("/{code}", get(tracking::show))
        .route(
            "/{code}/payment",
            post(tracking::upload_payment)
                .layer::<_, std::convert::Infallible>(write_rate_limiter())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(pages::about))
        .route("/outlets", get(pages::outlets))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/favorites", favorites_routes())
        .route(
            "/checkout",
            get(checkout::show).post(checkout::submit.layer(write_rate_limiter())),
        )
        .nest("/tracking", tracking_routes(max_upload_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_accepts_local_paths() {
        assert_eq!(
            return_path(Some("/products?category=dessert"), "/"),
            "/products?category=dessert"
        );
        assert_eq!(return_path(None, "/cart"), "/cart");
    }

    #[test]
    fn test_message_is_appended_to_query() {
        assert_eq!(
            with_message("/cart", "error", "Sold out"),
            "/cart?error=Sold%20out"
        );
        assert_eq!(
            with_message("/products?category=cookies#top", "notice", "Added"),
            "/products?category=cookies&notice=Added"
        );
    }

    #[test]
    fn test_return_path_rejects_offsite() {
        assert_eq!(return_path(Some("https://evil.example"), "/"), "/");
        assert_eq!(return_path(Some("//evil.example"), "/"), "/");
        assert_eq!(return_path(Some("/\\evil.example"), "/"), "/");
    }
}
