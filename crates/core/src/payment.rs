//! Payment-proof workflow rules.
//!
//! A proof can be uploaded once per order while it waits for verification.
//! An admin then accepts it (the payment becomes `valid`, the order moves to
//! `processing`) or rejects it (the payment row is deleted and the customer
//! uploads again).

use crate::order::{OrderEvent, TransitionError, apply};
use crate::types::{OrderStatus, PaymentStatus};

/// Why a payment operation was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRuleError {
    /// A proof is already on file for this order.
    #[error("a payment proof has already been uploaded for this order")]
    AlreadyUploaded,
    /// There is no proof to review.
    #[error("no payment proof has been uploaded for this order")]
    NoProof,
    /// The order no longer accepts a proof.
    #[error("order is {0} and no longer accepts a payment proof")]
    NotAwaitingPayment(OrderStatus),
    /// The proof was already reviewed.
    #[error("payment proof is already {0}")]
    AlreadyReviewed(PaymentStatus),
    /// The order is not waiting for verification.
    #[error(transparent)]
    Order(#[from] TransitionError),
}

/// Check that a customer may upload a proof.
///
/// # Errors
///
/// Refuses when the order has moved past `waiting_verification` or a proof
/// already exists.
pub fn check_upload(
    order: OrderStatus,
    existing: Option<PaymentStatus>,
) -> Result<(), PaymentRuleError> {
    if order != OrderStatus::WaitingVerification {
        return Err(PaymentRuleError::NotAwaitingPayment(order));
    }
    if existing.is_some() {
        return Err(PaymentRuleError::AlreadyUploaded);
    }
    Ok(())
}

/// Check a review decision and return the order's next status.
///
/// # Errors
///
/// Refuses when no proof exists, the proof was already reviewed, or the order
/// cannot take the event.
pub fn check_review(
    order: OrderStatus,
    payment: Option<PaymentStatus>,
    event: OrderEvent,
) -> Result<OrderStatus, PaymentRuleError> {
    match payment {
        None => Err(PaymentRuleError::NoProof),
        Some(PaymentStatus::WaitingVerification) => Ok(apply(order, event)?),
        Some(reviewed) => Err(PaymentRuleError::AlreadyReviewed(reviewed)),
    }
}

/// Whether the tracking page should offer the upload form.
#[must_use]
pub fn can_upload(order: OrderStatus, existing: Option<PaymentStatus>) -> bool {
    check_upload(order, existing).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_allowed_once_while_waiting() {
        assert!(can_upload(OrderStatus::WaitingVerification, None));
        assert_eq!(
            check_upload(
                OrderStatus::WaitingVerification,
                Some(PaymentStatus::WaitingVerification)
            ),
            Err(PaymentRuleError::AlreadyUploaded)
        );
        assert!(!can_upload(OrderStatus::Processing, None));
        assert!(!can_upload(OrderStatus::Cancelled, None));
    }

    #[test]
    fn test_accept_moves_to_processing() {
        assert_eq!(
            check_review(
                OrderStatus::WaitingVerification,
                Some(PaymentStatus::WaitingVerification),
                OrderEvent::PaymentAccepted,
            ),
            Ok(OrderStatus::Processing)
        );
    }

    #[test]
    fn test_reject_keeps_order_waiting() {
        assert_eq!(
            check_review(
                OrderStatus::WaitingVerification,
                Some(PaymentStatus::WaitingVerification),
                OrderEvent::PaymentRejected,
            ),
            Ok(OrderStatus::WaitingVerification)
        );
    }

    #[test]
    fn test_review_refused_after_acceptance() {
        assert_eq!(
            check_review(
                OrderStatus::Processing,
                Some(PaymentStatus::Valid),
                OrderEvent::PaymentRejected,
            ),
            Err(PaymentRuleError::AlreadyReviewed(PaymentStatus::Valid))
        );
    }

    #[test]
    fn test_review_without_proof() {
        assert_eq!(
            check_review(
                OrderStatus::WaitingVerification,
                None,
                OrderEvent::PaymentAccepted
            ),
            Err(PaymentRuleError::NoProof)
        );
    }

    #[test]
    fn test_review_refused_on_cancelled_order() {
        assert!(matches!(
            check_review(
                OrderStatus::Cancelled,
                Some(PaymentStatus::WaitingVerification),
                OrderEvent::PaymentAccepted,
            ),
            Err(PaymentRuleError::Order(_))
        ));
    }
}
