//! Order status changes and payment review.
//!
//! Decisions come from the state machine in `cooskie_core`; the repository
//! then applies them only if the order has not moved in the meantime.

use sqlx::PgPool;

use cooskie_core::OrderId;
use cooskie_core::order::{OrderAction, OrderEvent, TransitionError, apply};
use cooskie_core::payment::{PaymentRuleError, check_review};

use super::storage::UploadStore;
use crate::db::{OrderRepository, RepositoryError};
use crate::models::OrderSummary;

#[derive(Debug, thiserror::Error)]
pub enum OrderAdminError {
    #[error("order not found")]
    NotFound,

    /// The status button does not apply.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The payment cannot be reviewed.
    #[error(transparent)]
    Payment(#[from] PaymentRuleError),

    /// Another admin changed the order first.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OrderAdminError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl OrderAdminError {
    /// Whether to show the message as a flash instead of an error page.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Transition(_) | Self::Payment(_) | Self::Conflict(_)
        )
    }
}

pub struct OrderAdminService<'a> {
    orders: OrderRepository<'a>,
    uploads: &'a UploadStore,
}

impl<'a> OrderAdminService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, uploads: &'a UploadStore) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            uploads,
        }
    }

    /// Apply a ship, complete or cancel button.
    ///
    /// # Errors
    ///
    /// Returns `OrderAdminError::Transition` if the action does not apply to
    /// the current status and `OrderAdminError::Conflict` if the order moved.
    pub async fn change_status(
        &self,
        id: OrderId,
        action: OrderAction,
    ) -> Result<OrderSummary, OrderAdminError> {
        let summary = self.summary(id).await?;
        let next = apply(summary.status, action)?;

        self.orders.update_status(id, summary.status, next).await?;

        tracing::info!(
            order_id = %id,
            from = %summary.status,
            to = %next,
            action = action.as_str(),
            "Order status changed"
        );
        Ok(OrderSummary {
            status: next,
            ..summary
        })
    }

    /// Mark the proof valid; the order moves to processing.
    ///
    /// # Errors
    ///
    /// Returns `OrderAdminError::Payment` if there is no pending proof or the
    /// order is not waiting for verification.
    pub async fn accept_payment(&self, id: OrderId) -> Result<(), OrderAdminError> {
        let summary = self.summary(id).await?;
        let next = check_review(summary.status, summary.payment, OrderEvent::PaymentAccepted)?;

        self.orders.accept_payment(id, next).await?;

        tracing::info!(order_id = %id, to = %next, "Payment accepted");
        Ok(())
    }

    /// Delete the proof so the customer uploads again.
    ///
    /// # Errors
    ///
    /// Returns `OrderAdminError::Payment` if there is no pending proof.
    pub async fn reject_payment(&self, id: OrderId) -> Result<(), OrderAdminError> {
        let summary = self.summary(id).await?;
        check_review(summary.status, summary.payment, OrderEvent::PaymentRejected)?;

        let image_url = self.orders.reject_payment(id).await?;
        self.uploads.remove_quietly(&image_url).await;

        tracing::info!(order_id = %id, "Payment rejected");
        Ok(())
    }

    async fn summary(&self, id: OrderId) -> Result<OrderSummary, OrderAdminError> {
        self.orders
            .summary(id)
            .await?
            .ok_or(OrderAdminError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cooskie_core::{OrderStatus, PaymentStatus};

    use super::*;

    #[test]
    fn test_repository_conflict_maps_to_conflict() {
        let err: OrderAdminError = RepositoryError::Conflict("stale".to_string()).into();
        assert!(matches!(err, OrderAdminError::Conflict(ref m) if m == "stale"));
        assert!(err.is_user_facing());

        let err: OrderAdminError = RepositoryError::NotFound.into();
        assert!(matches!(err, OrderAdminError::NotFound));
    }

    #[test]
    fn test_rule_errors_are_user_facing() {
        let err: OrderAdminError = apply(OrderStatus::Completed, OrderAction::Cancel)
            .unwrap_err()
            .into();
        assert!(err.is_user_facing());

        let err: OrderAdminError = check_review(
            OrderStatus::Processing,
            Some(PaymentStatus::Valid),
            OrderEvent::PaymentRejected,
        )
        .unwrap_err()
        .into();
        assert!(err.is_user_facing());

        let err = OrderAdminError::Repository(RepositoryError::DataCorruption("x".into()));
        assert!(!err.is_user_facing());
    }
}
