//! Orders as the back-office sees them.

use chrono::{DateTime, Utc};

use cooskie_core::order::{OrderAction, OrderEvent, available_actions};
use cooskie_core::payment::check_review;
use cooskie_core::{DeliveryType, OrderId, OrderStatus, PaymentStatus, PhoneNumber, Price};

/// One purchased line, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// `None` when the product has since been deleted.
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderLine {
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The uploaded transfer proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub image_url: String,
    pub status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The status fields needed to decide on an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub payment: Option<PaymentStatus>,
}

/// An order with its lines, outlet and payment.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminOrder {
    pub id: OrderId,
    pub tracking_code: String,
    pub guest_name: String,
    pub phone: PhoneNumber,
    pub email: String,
    pub delivery_type: DeliveryType,
    pub outlet_name: Option<String>,
    pub address: Option<String>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub payment: Option<Payment>,
}

impl AdminOrder {
    /// Status buttons offered for the current status.
    #[must_use]
    pub fn actions(&self) -> Vec<OrderAction> {
        available_actions(self.status)
    }

    /// Whether the accept/reject buttons apply.
    #[must_use]
    pub fn can_review_payment(&self) -> bool {
        check_review(
            self.status,
            self.payment.as_ref().map(|p| p.status),
            OrderEvent::PaymentAccepted,
        )
        .is_ok()
    }

    /// `wa.me` link with a status update prefilled for the customer.
    #[must_use]
    pub fn whatsapp_url(&self) -> String {
        let message = format!(
            "Hi {}, your Cooskie order *{}* is now: *{}*. Thank you!",
            self.guest_name,
            self.tracking_code,
            self.status.label()
        );
        format!(
            "https://wa.me/{}?text={}",
            self.phone.whatsapp_number(),
            urlencoding::encode(&message)
        )
    }

    /// Where the order goes: the outlet name for pickup, else the address.
    #[must_use]
    pub fn destination(&self) -> &str {
        match self.delivery_type {
            DeliveryType::Pickup => self.outlet_name.as_deref().unwrap_or("Outlet removed"),
            DeliveryType::Delivery => self.address.as_deref().unwrap_or(""),
        }
    }

    /// Sum of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, payment: Option<PaymentStatus>) -> AdminOrder {
        AdminOrder {
            id: OrderId::new(7),
            tracking_code: "CSK-AB12-3456".to_string(),
            guest_name: "Sari".to_string(),
            phone: PhoneNumber::parse("0812-3456-7890").unwrap(),
            email: "sari@example.com".to_string(),
            delivery_type: DeliveryType::Pickup,
            outlet_name: Some("Cooskie Kemang".to_string()),
            address: None,
            total: Price::from_rupiah(45_000),
            status,
            created_at: Utc::now(),
            items: vec![
                OrderLine {
                    product_name: Some("Choco Chip".to_string()),
                    quantity: 2,
                    unit_price: Price::from_rupiah(15_000),
                },
                OrderLine {
                    product_name: None,
                    quantity: 1,
                    unit_price: Price::from_rupiah(15_000),
                },
            ],
            payment: payment.map(|status| Payment {
                image_url: "/uploads/payment-proofs/7_1.png".to_string(),
                status,
                notes: None,
                created_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_whatsapp_url_normalises_phone() {
        let url = order(OrderStatus::Processing, None).whatsapp_url();
        assert!(url.starts_with("https://wa.me/6281234567890?text="));
        assert!(url.contains("CSK-AB12-3456"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_payment_review_needs_pending_proof() {
        assert!(
            order(
                OrderStatus::WaitingVerification,
                Some(PaymentStatus::WaitingVerification)
            )
            .can_review_payment()
        );
        assert!(!order(OrderStatus::WaitingVerification, None).can_review_payment());
        assert!(
            !order(OrderStatus::Processing, Some(PaymentStatus::Valid)).can_review_payment()
        );
    }

    #[test]
    fn test_actions_follow_status() {
        assert_eq!(
            order(OrderStatus::Processing, Some(PaymentStatus::Valid)).actions(),
            vec![OrderAction::Ship, OrderAction::Cancel]
        );
        assert!(order(OrderStatus::Completed, None).actions().is_empty());
    }

    #[test]
    fn test_item_count_and_destination() {
        let order = order(OrderStatus::Processing, None);
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.destination(), "Cooskie Kemang");
    }
}
