//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cooskie_core::catalog::CategoryFilter;
use cooskie_core::review::{ReviewForm, average_rating};

use super::{Flash, Nav, redirect_with_error, redirect_with_notice};
use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Product, Review};
use crate::services::client_state;
use crate::state::AppState;

/// Catalog query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub category: CategoryFilter,
    pub q: Option<String>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub products: Vec<Product>,
    pub tabs: &'static [CategoryFilter],
    pub active: CategoryFilter,
    pub search: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: Product,
    pub reviews: Vec<Review>,
    pub average: String,
    pub is_favorite: bool,
    pub flash: Flash,
}

/// Display the catalog, newest first.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate> {
    let search = query.q.unwrap_or_default().trim().to_owned();
    let products = ProductRepository::new(state.pool())
        .list(query.category.category(), Some(&search))
        .await?;

    Ok(ProductsIndexTemplate {
        nav: Nav::load(&session).await,
        products,
        tabs: &CategoryFilter::ALL,
        active: query.category,
        search,
    })
}

/// Display a product with its reviews.
#[instrument(skip(state, session, flash))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<ProductShowTemplate> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product.id)
        .await?;
    let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();
    let average = format!("{:.1}", average_rating(&ratings, product.rating));

    let is_favorite = client_state::load_favorites(&session)
        .await
        .contains(product.id);

    Ok(ProductShowTemplate {
        nav: Nav::load(&session).await,
        product,
        reviews,
        average,
        is_favorite,
        flash,
    })
}

/// Post a guest review, then return to the product page.
#[instrument(skip(state, form), fields(slug = %slug))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;
    let page = format!("/products/{}", product.slug);

    let review = match form.validate() {
        Ok(review) => review,
        Err(e) => return Ok(redirect_with_error(&page, &e.to_string())),
    };

    let created = ReviewRepository::new(state.pool())
        .create(product.id, &review)
        .await?;
    tracing::info!(review_id = %created.id, product_id = %product.id, "Review posted");

    Ok(redirect_with_notice(&page, "Thanks for your review!"))
}
