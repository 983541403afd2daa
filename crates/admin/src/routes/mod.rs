//! HTTP route handlers for the back-office.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (email + password, admin role only)
//! GET  /auth/login                    - Login page
//! POST /auth/login                    - Check credentials, start session
//! POST /auth/logout                   - End session
//!
//! # Dashboard
//! GET  /                              - Counts and revenue
//!
//! # Products
//! GET  /products                      - Product list (?q=)
//! GET  /products/new                  - New product form
//! POST /products                      - Create (multipart, optional image)
//! GET  /products/{id}/edit            - Edit form
//! POST /products/{id}                 - Update (multipart, optional image)
//! POST /products/{id}/delete          - Delete
//!
//! # Outlets
//! GET  /outlets                       - Outlet list (?q=)
//! GET  /outlets/new                   - New outlet form
//! POST /outlets                       - Create (multipart, optional image)
//! GET  /outlets/{id}/edit             - Edit form
//! POST /outlets/{id}                  - Update (multipart, optional image)
//! POST /outlets/{id}/delete           - Delete
//!
//! # Orders
//! GET  /orders                        - Order list
//! GET  /orders/{id}                   - Order detail with proof
//! POST /orders/{id}/status            - Ship, complete or cancel
//! POST /orders/{id}/payment/accept    - Accept the transfer proof
//! POST /orders/{id}/payment/reject    - Reject (delete) the transfer proof
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod outlets;
pub mod products;

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;

use cooskie_core::storage::ImageFolder;

use crate::error::{AppError, Result};
use crate::models::{CurrentAdmin, OutletForm, ProductForm};
use crate::services::ImageUpload;
use crate::state::AppState;

/// Multipart field carrying a catalog image.
pub const IMAGE_FIELD: &str = "image";

/// Room for multipart boundaries and the other form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Logged-in admin and current section, for the layout.
#[derive(Debug, Clone)]
pub struct AdminView {
    pub name: String,
    pub email: String,
    pub section: &'static str,
}

impl AdminView {
    #[must_use]
    pub fn new(admin: &CurrentAdmin, section: &'static str) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            section,
        }
    }
}

/// One-shot message carried on a redirect's query string.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            notice: None,
        }
    }
}

/// `?q=` search on list pages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    #[must_use]
    pub fn flash(&self) -> Flash {
        Flash {
            error: self.error.clone(),
            notice: self.notice.clone(),
        }
    }
}

fn with_message(path: &str, key: &str, message: &str) -> String {
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

/// Render a template into an HTML response.
///
/// # Errors
///
/// Returns `AppError::Template` if rendering fails.
pub fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// A form whose text fields can be filled from multipart parts.
pub trait MultipartForm: Default {
    fn set_field(&mut self, name: &str, value: String);
}

impl MultipartForm for ProductForm {
    fn set_field(&mut self, name: &str, value: String) {
        self.set(name, value);
    }
}

impl MultipartForm for OutletForm {
    fn set_field(&mut self, name: &str, value: String) {
        self.set(name, value);
    }
}

/// Read a catalog form and its optional image from a multipart body.
///
/// An image part with no bytes (no file chosen) counts as no image.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the body is malformed or too large.
pub async fn read_multipart<F: MultipartForm>(
    multipart: &mut Multipart,
) -> Result<(F, Option<ImageUpload>)> {
    let mut form = F::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == IMAGE_FIELD {
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                image = Some(ImageUpload {
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            form.set_field(&name, value);
        }
    }

    Ok((form, image))
}

/// Store an optional catalog image and return its URL.
///
/// # Errors
///
/// Returns `AppError::Storage`; `StorageError::Rejected` carries a message
/// for the form.
pub async fn store_image(
    state: &AppState,
    folder: ImageFolder,
    image: Option<&ImageUpload>,
) -> Result<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };
    Ok(Some(state.uploads().put_image(folder, image).await?))
}

/// Upload cap in whole megabytes, for form hints.
#[must_use]
pub fn max_upload_mb(state: &AppState) -> usize {
    state.uploads().max_bytes() / (1024 * 1024)
}

/// Create the product routes router.
pub fn product_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route("/{id}/delete", post(products::delete))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Create the outlet routes router.
pub fn outlet_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(outlets::index).post(outlets::create))
        .route("/new", get(outlets::new))
        .route("/{id}", post(outlets::update))
        .route("/{id}/edit", get(outlets::edit))
        .route("/{id}/delete", post(outlets::delete))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list::index))
        .route("/{id}", get(orders::detail::show))
        .route("/{id}/status", post(orders::actions::update_status))
        .route("/{id}/payment/accept", post(orders::actions::accept_payment))
        .route("/{id}/payment/reject", post(orders::actions::reject_payment))
}

/// Create all routes for the back-office.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let body_limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth::router())
        .nest("/products", product_routes(body_limit))
        .nest("/outlets", outlet_routes(body_limit))
        .nest("/orders", order_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_appended_to_query() {
        assert_eq!(
            with_message("/orders/4", "error", "Order changed"),
            "/orders/4?error=Order%20changed"
        );
        assert_eq!(
            with_message("/products?q=choco", "notice", "Saved"),
            "/products?q=choco&notice=Saved"
        );
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let query = SearchQuery {
            q: Some("   ".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(query.term(), None);

        let query = SearchQuery {
            q: Some(" nastar ".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(query.term(), Some("nastar"));
    }
}
