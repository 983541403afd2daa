//! Cart route handlers.
//!
//! The cart lives in the visitor's session as a list of product snapshots,
//! so every mutation is a session read-modify-write followed by a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cooskie_core::ProductId;
use cooskie_core::cart::Cart;

use super::{Flash, Nav, redirect_with_error, redirect_with_notice, return_path};
use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::services::client_state;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: Cart,
    pub flash: Flash,
}

/// Display cart page.
#[instrument(skip(session, flash))]
pub async fn show(session: Session, Query(flash): Query<Flash>) -> CartShowTemplate {
    CartShowTemplate {
        nav: Nav::load(&session).await,
        cart: client_state::load_cart(&session).await,
        flash,
    }
}

/// Add one unit of a product to the cart.
///
/// Out-of-stock products are refused with a message on the page the visitor
/// came from.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let back = return_path(form.return_to.as_deref(), "/cart");
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(form.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    if !product.in_stock() {
        return Ok(redirect_with_error(
            back,
            &format!("{} is out of stock", product.name),
        ));
    }

    let mut cart = client_state::load_cart(&session).await;
    cart.add(product.snapshot());
    client_state::save_cart(&session, &cart).await?;

    let id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    Ok(redirect_with_notice(
        back,
        &format!("{} added to cart", product.name),
    ))
}

/// Change a line's quantity by `delta`, never below one.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut cart = client_state::load_cart(&session).await;
    if cart
        .update_qty(ProductId::new(form.product_id), form.delta)
        .is_some()
    {
        client_state::save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = client_state::load_cart(&session).await;
    if cart.remove(ProductId::new(form.product_id)) {
        client_state::save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    client_state::save_cart(&session, &Cart::default()).await?;
    Ok(Redirect::to("/cart"))
}
