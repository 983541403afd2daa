//! Order status state machine.
//!
//! ```text
//! waiting_verification ──PaymentAccepted──▶ processing ──Ship──▶ shipped ──Complete──▶ completed
//!        │   ▲                                  │
//!        │   └── PaymentRejected                │
//!        └────────────Cancel────────────────────┴──────▶ cancelled
//! ```
//!
//! Admins drive [`OrderAction`]s by hand; the payment workflow produces
//! [`OrderEvent::PaymentAccepted`] and [`OrderEvent::PaymentRejected`].

use serde::{Deserialize, Serialize};

use crate::types::OrderStatus;

/// A manual status change an admin can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// `processing → shipped`.
    Ship,
    /// `shipped → completed`.
    Complete,
    /// `waiting_verification | processing → cancelled`.
    Cancel,
}

impl OrderAction {
    /// Button label in the back-office.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ship => "Mark as shipped",
            Self::Complete => "Mark as completed",
            Self::Cancel => "Cancel order",
        }
    }

    /// Form value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ship => "ship",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

/// Anything that moves an order between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// An admin pressed a status button.
    Manual(OrderAction),
    /// The payment proof was accepted.
    PaymentAccepted,
    /// The payment proof was rejected and deleted.
    PaymentRejected,
}

impl From<OrderAction> for OrderEvent {
    fn from(action: OrderAction) -> Self {
        Self::Manual(action)
    }
}

/// The event is not allowed from the order's current status.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot apply {event:?} to an order that is {from}")]
pub struct TransitionError {
    /// Status the order was in.
    pub from: OrderStatus,
    /// Event that was refused.
    pub event: OrderEvent,
}

/// Compute the status after `event`.
///
/// # Errors
///
/// Returns [`TransitionError`] when the event is not valid from `from`.
pub fn apply(from: OrderStatus, event: impl Into<OrderEvent>) -> Result<OrderStatus, TransitionError> {
    let event = event.into();
    let next = match (from, event) {
        (OrderStatus::WaitingVerification, OrderEvent::PaymentAccepted) => OrderStatus::Processing,
        (OrderStatus::WaitingVerification, OrderEvent::PaymentRejected) => {
            OrderStatus::WaitingVerification
        }
        (OrderStatus::Processing, OrderEvent::Manual(OrderAction::Ship)) => OrderStatus::Shipped,
        (OrderStatus::Shipped, OrderEvent::Manual(OrderAction::Complete)) => OrderStatus::Completed,
        (
            OrderStatus::WaitingVerification | OrderStatus::Processing,
            OrderEvent::Manual(OrderAction::Cancel),
        ) => OrderStatus::Cancelled,
        _ => return Err(TransitionError { from, event }),
    };
    Ok(next)
}

/// Manual actions offered for an order in `status`.
#[must_use]
pub fn available_actions(status: OrderStatus) -> Vec<OrderAction> {
    [OrderAction::Ship, OrderAction::Complete, OrderAction::Cancel]
        .into_iter()
        .filter(|action| apply(status, *action).is_ok())
        .collect()
}

impl std::str::FromStr for OrderAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ship" => Ok(Self::Ship),
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            _ => Err(format!("invalid order action: {s}")),
        }
    }
}
