//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tracing::instrument;

use super::{AdminView, render};
use crate::db::{DashboardRepository, OrderRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{AdminOrder, DashboardStats};
use crate::state::AppState;

/// Orders listed under the figures.
const RECENT_ORDERS: i64 = 5;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin: AdminView,
    pub stats: DashboardStats,
    pub recent_orders: Vec<AdminOrder>,
}

/// GET /
#[instrument(skip_all)]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let dashboard_repo = DashboardRepository::new(state.pool());
    let order_repo = OrderRepository::new(state.pool());
    let (stats, orders) = tokio::join!(
        dashboard_repo.stats(),
        order_repo.list(Some(RECENT_ORDERS)),
    );

    render(&DashboardTemplate {
        admin: AdminView::new(&admin, "dashboard"),
        stats: stats?,
        recent_orders: orders?,
    })
}
