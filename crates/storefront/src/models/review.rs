//! Guest review of a product.

use chrono::{DateTime, Utc};

use cooskie_core::{ProductId, ReviewId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub guest_name: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
