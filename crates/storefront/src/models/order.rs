//! Order as seen on the tracking page.

use chrono::{DateTime, Utc};

use cooskie_core::{DeliveryType, OrderId, OrderStatus, PaymentStatus, Price};

/// An order looked up by tracking code, with everything the tracking page
/// shows.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    pub id: OrderId,
    pub tracking_code: String,
    pub guest_name: String,
    pub delivery_type: DeliveryType,
    pub outlet_name: Option<String>,
    pub outlet_address: Option<String>,
    pub address: Option<String>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<TrackedItem>,
    pub payment: Option<PaymentProof>,
}

/// One purchased line, priced at the time of purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    /// `None` when the product has since been deleted.
    pub product_name: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub unit_price: Price,
}

impl TrackedItem {
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The uploaded transfer proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub image_url: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
