//! Product management.

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use cooskie_core::storage::ImageFolder;
use cooskie_core::{ProductCategory, ProductId};

use super::{
    AdminView, Flash, SearchQuery, max_upload_mb, read_multipart, redirect_with_notice, render,
    store_image,
};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Product, ProductForm};
use crate::services::StorageError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin: AdminView,
    pub products: Vec<Product>,
    pub search: String,
    pub flash: Flash,
}

#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin: AdminView,
    pub form: ProductForm,
    /// The product being edited; `None` on the new-product page.
    pub product: Option<Product>,
    pub categories: &'static [ProductCategory],
    pub error: Option<String>,
    pub max_upload_mb: usize,
}

fn form_page(
    state: &AppState,
    admin: &CurrentAdmin,
    form: ProductForm,
    product: Option<Product>,
    error: Option<String>,
) -> Result<Response> {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let html = render(&ProductFormTemplate {
        admin: AdminView::new(admin, "products"),
        form,
        product,
        categories: &ProductCategory::ALL,
        error,
        max_upload_mb: max_upload_mb(state),
    })?;
    Ok((status, html).into_response())
}

async fn find(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// GET /products
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>> {
    let products = ProductRepository::new(state.pool())
        .list(query.term())
        .await?;

    render(&ProductsIndexTemplate {
        admin: AdminView::new(&admin, "products"),
        products,
        search: query.term().unwrap_or_default().to_owned(),
        flash: query.flash(),
    })
}

/// GET /products/new
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Response> {
    form_page(&state, &admin, ProductForm::default(), None, None)
}

/// POST /products
#[instrument(skip_all)]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let (form, image) = read_multipart::<ProductForm>(&mut multipart).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return form_page(&state, &admin, form, None, Some(e.to_string())),
    };

    let image_url = match store_image(&state, ImageFolder::Products, image.as_ref()).await {
        Ok(url) => url,
        Err(AppError::Storage(StorageError::Rejected(e))) => {
            return form_page(&state, &admin, form, None, Some(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    match ProductRepository::new(state.pool())
        .create(&input, image_url.as_deref())
        .await
    {
        Ok(id) => {
            tracing::info!(product_id = %id, slug = %input.slug, "Product created");
            Ok(redirect_with_notice("/products", &format!("{} created", input.name)).into_response())
        }
        Err(RepositoryError::Conflict(message)) => {
            if let Some(url) = &image_url {
                state.uploads().remove_quietly(url).await;
            }
            form_page(&state, &admin, form, None, Some(message))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /products/{id}/edit
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product = find(&state, id).await?;
    form_page(&state, &admin, product.to_form(), Some(product), None)
}

/// POST /products/{id}
#[instrument(skip(admin, state, multipart))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut multipart: Multipart,
) -> Result<Response> {
    let product = find(&state, id).await?;
    let (form, image) = read_multipart::<ProductForm>(&mut multipart).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return form_page(&state, &admin, form, Some(product), Some(e.to_string())),
    };

    let image_url = match store_image(&state, ImageFolder::Products, image.as_ref()).await {
        Ok(url) => url,
        Err(AppError::Storage(StorageError::Rejected(e))) => {
            return form_page(&state, &admin, form, Some(product), Some(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    match ProductRepository::new(state.pool())
        .update(id, &input, image_url.as_deref())
        .await
    {
        Ok(()) => {
            if image_url.is_some()
                && let Some(old) = &product.image_url
            {
                state.uploads().remove_quietly(old).await;
            }
            tracing::info!(product_id = %id, "Product updated");
            Ok(redirect_with_notice("/products", &format!("{} saved", input.name)).into_response())
        }
        Err(RepositoryError::Conflict(message)) => {
            if let Some(url) = &image_url {
                state.uploads().remove_quietly(url).await;
            }
            form_page(&state, &admin, form, Some(product), Some(message))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /products/{id}/delete
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    let image_url = match ProductRepository::new(state.pool()).delete(id).await {
        Ok(url) => url,
        Err(RepositoryError::NotFound) => {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(url) = image_url {
        state.uploads().remove_quietly(&url).await;
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(redirect_with_notice("/products", "Product deleted"))
}
