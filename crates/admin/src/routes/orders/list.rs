//! Order list handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use cooskie_core::OrderStatus;

use super::super::{AdminView, Flash, render};
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminOrder;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    /// Only show orders in this status.
    pub status: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl OrderListQuery {
    /// The status filter, ignoring unknown values.
    #[must_use]
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}

#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin: AdminView,
    pub orders: Vec<AdminOrder>,
    pub statuses: &'static [OrderStatus],
    pub selected: Option<OrderStatus>,
    pub flash: Flash,
}

impl OrdersIndexTemplate {
    fn is_selected(&self, status: &str) -> bool {
        self.selected.is_some_and(|s| s.as_str() == status)
    }
}

/// GET /orders
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Html<String>> {
    let selected = query.status();
    let mut orders = OrderRepository::new(state.pool()).list(None).await?;
    if let Some(status) = selected {
        orders.retain(|o| o.status == status);
    }

    render(&OrdersIndexTemplate {
        admin: AdminView::new(&admin, "orders"),
        orders,
        statuses: &OrderStatus::ALL,
        selected,
        flash: Flash {
            error: query.error,
            notice: query.notice,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parses_known_values() {
        let query = OrderListQuery {
            status: Some("shipped".to_string()),
            ..OrderListQuery::default()
        };
        assert_eq!(query.status(), Some(OrderStatus::Shipped));

        let query = OrderListQuery {
            status: Some("lost".to_string()),
            ..OrderListQuery::default()
        };
        assert_eq!(query.status(), None);
    }
}
