//! Catalog product.

use chrono::{DateTime, Utc};

use cooskie_core::cart::ProductSnapshot;
use cooskie_core::{Price, ProductCategory, ProductId};

/// A product as shown in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub description: String,
    pub category: ProductCategory,
    pub image_url: Option<String>,
    pub stock: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can be added to the cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The fields copied into the cart or favorites.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            category: self.category,
        }
    }
}
