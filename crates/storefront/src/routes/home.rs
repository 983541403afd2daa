//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::Nav;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::models::Product;
use crate::state::AppState;

/// Number of products featured on the home page.
const NEWEST_PRODUCTS: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub products: Vec<Product>,
}

/// Display the home page with the newest products.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let products = ProductRepository::new(state.pool())
        .newest(NEWEST_PRODUCTS)
        .await?;

    Ok(HomeTemplate {
        nav: Nav::load(&session).await,
        products,
    })
}
