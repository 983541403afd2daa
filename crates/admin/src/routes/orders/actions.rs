//! Status buttons and payment review.
//!
//! Refused actions come back to the detail page as an `?error=` flash.

use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use cooskie_core::OrderId;
use cooskie_core::order::OrderAction;

use super::super::{redirect_with_error, redirect_with_notice};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::OrderAdminError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    /// `ship`, `complete` or `cancel`.
    pub action: String,
}

fn detail_path(id: OrderId) -> String {
    format!("/orders/{id}")
}

fn outcome(
    id: OrderId,
    result: std::result::Result<(), OrderAdminError>,
    notice: &str,
) -> Result<Redirect> {
    match result {
        Ok(()) => Ok(redirect_with_notice(&detail_path(id), notice)),
        Err(OrderAdminError::NotFound) => Err(AppError::NotFound(format!("order {id}"))),
        Err(e) if e.is_user_facing() => Ok(redirect_with_error(&detail_path(id), &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// POST /orders/{id}/status
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Form(input): Form<StatusInput>,
) -> Result<Redirect> {
    let action = input
        .action
        .parse::<OrderAction>()
        .map_err(AppError::BadRequest)?;

    match state.orders().change_status(id, action).await {
        Ok(summary) => Ok(redirect_with_notice(
            &detail_path(id),
            &format!("Order is now {}", summary.status.label()),
        )),
        Err(e) => outcome(id, Err(e), ""),
    }
}

/// POST /orders/{id}/payment/accept
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn accept_payment(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let result = state.orders().accept_payment(id).await;
    outcome(id, result, "Payment accepted; the order is now processing")
}

/// POST /orders/{id}/payment/reject
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn reject_payment(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let result = state.orders().reject_payment(id).await;
    outcome(
        id,
        result,
        "Payment proof rejected; the customer can upload a new one",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;

    use cooskie_core::OrderStatus;
    use cooskie_core::payment::PaymentRuleError;

    use super::*;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get("location")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_refused_action_flashes_error() {
        let id = OrderId::new(9);
        let result = Err(OrderAdminError::Payment(PaymentRuleError::NoProof));
        let redirect = outcome(id, result, "done").unwrap();
        assert!(location(redirect).starts_with("/orders/9?error="));
    }

    #[test]
    fn test_success_flashes_notice() {
        let redirect = outcome(OrderId::new(9), Ok(()), "Payment accepted").unwrap();
        assert_eq!(location(redirect), "/orders/9?notice=Payment%20accepted");
    }

    #[test]
    fn test_unknown_order_is_not_found() {
        let result = outcome(OrderId::new(9), Err(OrderAdminError::NotFound), "done");
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = outcome(
            OrderId::new(9),
            Err(OrderAdminError::Transition(
                cooskie_core::order::apply(OrderStatus::Completed, OrderAction::Ship).unwrap_err(),
            )),
            "done",
        );
        assert!(result.is_ok());
    }
}
