//! Order detail handler.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use tracing::instrument;

use cooskie_core::OrderId;

use super::super::{AdminView, Flash, render};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminOrder;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin: AdminView,
    pub order: AdminOrder,
    pub flash: Flash,
}

/// GET /orders/{id}
#[instrument(skip(admin, state, flash))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Query(flash): Query<Flash>,
) -> Result<Html<String>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    render(&OrderShowTemplate {
        admin: AdminView::new(&admin, "orders"),
        order,
        flash,
    })
}
