//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use cooskie_core::DeliveryType;
use cooskie_core::cart::{Cart, OrderHistoryEntry};
use cooskie_core::checkout::CheckoutForm;

use super::{Nav, redirect_with_error};
use crate::db::OutletRepository;
use crate::error::Result;
use crate::filters;
use crate::models::Outlet;
use crate::services::{OrderError, client_state};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub cart: Cart,
    pub outlets: Vec<Outlet>,
    pub form: CheckoutForm,
    pub delivery: bool,
    pub error: Option<String>,
}

impl CheckoutTemplate {
    async fn render_for(
        state: &AppState,
        session: &Session,
        cart: Cart,
        form: CheckoutForm,
        error: Option<String>,
    ) -> Result<Self> {
        let outlets = OutletRepository::new(state.pool()).list().await?;
        Ok(Self {
            nav: Nav::load(session).await,
            delivery: form.delivery_type == DeliveryType::Delivery,
            cart,
            outlets,
            form,
            error,
        })
    }
}

/// Display the checkout form, or send an empty cart back to the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = client_state::load_cart(&session).await;
    if cart.is_empty() {
        return Ok(redirect_with_error("/cart", "Your cart is empty").into_response());
    }

    let page =
        CheckoutTemplate::render_for(&state, &session, cart, CheckoutForm::default(), None).await?;
    Ok(page.into_response())
}

/// Place the order and redirect to its tracking page.
///
/// Invalid input re-renders the form with the message and the values the
/// visitor typed.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = client_state::load_cart(&session).await;

    let placed = match state.orders().place_order(&form, &cart).await {
        Ok(placed) => placed,
        Err(OrderError::Checkout(e)) => {
            tracing::debug!(error = %e, "Checkout rejected");
            let page =
                CheckoutTemplate::render_for(&state, &session, cart, form, Some(e.to_string()))
                    .await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    cart.clear();
    client_state::save_cart(&session, &cart).await?;

    let mut history = client_state::load_orders(&session).await;
    history.record(OrderHistoryEntry {
        tracking_code: placed.tracking_code.to_string(),
        total: placed.total,
        item_count: placed.item_count,
        created_at: Utc::now(),
    });
    client_state::save_orders(&session, &history).await?;

    Ok(Redirect::to(&format!("/tracking/{}", placed.tracking_code)).into_response())
}
