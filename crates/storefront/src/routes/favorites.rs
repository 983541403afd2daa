//! Favorites route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cooskie_core::ProductId;
use cooskie_core::cart::Favorites;

use super::{Nav, return_path};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::services::client_state;
use crate::state::AppState;

/// Toggle favorite form data.
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteForm {
    pub product_id: i32,
    pub return_to: Option<String>,
}

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub nav: Nav,
    pub favorites: Favorites,
}

/// Display the visitor's favorites.
#[instrument(skip(session))]
pub async fn index(session: Session) -> FavoritesTemplate {
    FavoritesTemplate {
        nav: Nav::load(&session).await,
        favorites: client_state::load_favorites(&session).await,
    }
}

/// Add the product to favorites, or remove it if already there.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ToggleFavoriteForm>,
) -> Result<Redirect> {
    let mut favorites = client_state::load_favorites(&session).await;
    let id = ProductId::new(form.product_id);

    if !favorites.remove(id) {
        let product = ProductRepository::new(state.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        favorites.toggle(product.snapshot());
    }

    client_state::save_favorites(&session, &favorites).await?;
    Ok(Redirect::to(return_path(
        form.return_to.as_deref(),
        "/favorites",
    )))
}
