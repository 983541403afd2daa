//! Visitor-local cart, favorites and order history.
//!
//! These lists never touch the catalog tables. The storefront keeps them in
//! the visitor's session under [`CART_KEY`], [`FAVORITES_KEY`] and
//! [`ORDERS_KEY`]; each type deserializes from whatever JSON is stored there,
//! and callers treat a deserialization error as an empty list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductCategory, ProductId};

/// Session key for the cart.
pub const CART_KEY: &str = "cooskie_cart";
/// Session key for the favorites list.
pub const FAVORITES_KEY: &str = "cooskie_favorites";
/// Session key for the order-history cache.
pub const ORDERS_KEY: &str = "cooskie_orders";

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Most recent orders kept in the history cache.
pub const ORDER_HISTORY_LIMIT: usize = 20;

/// The product fields copied into the cart when it is added.
///
/// The unit price here is what the customer pays at checkout, even if the
/// catalog price changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: ProductCategory,
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price × quantity.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The visitor's cart. Each product appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl From<Vec<CartItem>> for Cart {
    fn from(raw: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in raw {
            let quantity = item.quantity.clamp(1, MAX_LINE_QUANTITY);
            match cart.position(item.product.id) {
                Some(idx) => {
                    if let Some(existing) = cart.items.get_mut(idx) {
                        existing.quantity = existing
                            .quantity
                            .saturating_add(quantity)
                            .min(MAX_LINE_QUANTITY);
                    }
                }
                None => cart.items.push(CartItem {
                    product: item.product,
                    quantity,
                }),
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl Cart {
    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.product.id == id)
    }

    /// Add one unit of `product`, merging with an existing line. A line
    /// already at [`MAX_LINE_QUANTITY`] stays there.
    pub fn add(&mut self, product: ProductSnapshot) {
        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            }
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != id);
        self.items.len() != before
    }

    /// Change the quantity of `id` by `delta`, kept within
    /// `1..=MAX_LINE_QUANTITY`.
    ///
    /// Returns the new quantity, or `None` if the product is not in the cart.
    pub fn update_qty(&mut self, id: ProductId, delta: i32) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.product.id == id)?;
        let next = i64::from(item.quantity)
            .saturating_add(i64::from(delta))
            .clamp(1, i64::from(MAX_LINE_QUANTITY));
        item.quantity = u32::try_from(next).unwrap_or(MAX_LINE_QUANTITY);
        Some(item.quantity)
    }

    #[cfg(test)]
    pub(crate) const fn from_items_unchecked(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Σ unit price × quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Products the visitor has marked as favorite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<ProductSnapshot>);

impl Favorites {
    /// Add `product` if absent, remove it if present.
    ///
    /// Returns `true` when the product is a favorite afterwards.
    pub fn toggle(&mut self, product: ProductSnapshot) -> bool {
        let before = self.0.len();
        self.0.retain(|p| p.id != product.id);
        if self.0.len() == before {
            self.0.push(product);
            true
        } else {
            false
        }
    }

    /// Drop a favorite by id. Returns `true` if it was present.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|p| p.id != id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.0.iter().any(|p| p.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[ProductSnapshot] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A placed order remembered for the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryEntry {
    pub tracking_code: String,
    pub total: Price,
    pub item_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Orders placed from this session, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderHistory(Vec<OrderHistoryEntry>);

impl OrderHistory {
    /// Prepend `entry`, dropping the oldest beyond [`ORDER_HISTORY_LIMIT`].
    pub fn record(&mut self, entry: OrderHistoryEntry) {
        self.0.retain(|e| e.tracking_code != entry.tracking_code);
        self.0.insert(0, entry);
        self.0.truncate(ORDER_HISTORY_LIMIT);
    }

    #[must_use]
    pub fn entries(&self) -> &[OrderHistoryEntry] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot(id: i32, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Cookie {id}"),
            slug: format!("cookie-{id}"),
            price: Price::from_rupiah(price),
            image_url: None,
            category: ProductCategory::Cookies,
        }
    }

    #[test]
    fn test_adding_same_product_twice_increments_quantity() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        cart.add(snapshot(1, 15_000));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 2);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_remove_only_touches_that_product() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        cart.add(snapshot(2, 20_000));
        cart.add(snapshot(3, 25_000));

        assert!(cart.remove(ProductId::new(2)));
        let ids: Vec<i32> = cart.items().iter().map(|i| i.product.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(!cart.remove(ProductId::new(2)));
    }

    #[test]
    fn test_update_qty_clamps_to_one() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        assert_eq!(cart.update_qty(ProductId::new(1), 4), Some(5));
        assert_eq!(cart.update_qty(ProductId::new(1), -10), Some(1));
        assert_eq!(cart.update_qty(ProductId::new(9), 1), None);
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        assert_eq!(
            cart.update_qty(ProductId::new(1), i32::MAX),
            Some(MAX_LINE_QUANTITY)
        );
        assert_eq!(
            cart.update_qty(ProductId::new(1), i32::MAX),
            Some(MAX_LINE_QUANTITY)
        );
        cart.add(snapshot(1, 15_000));
        assert_eq!(cart.count(), MAX_LINE_QUANTITY);
        assert_eq!(cart.update_qty(ProductId::new(1), i32::MIN), Some(1));
    }

    #[test]
    fn test_stored_quantity_is_capped() {
        let item = serde_json::to_value(snapshot(1, 10_000)).unwrap();
        let value = serde_json::json!([
            {"product": item, "quantity": u32::MAX},
            {"product": item, "quantity": 5},
        ]);
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(cart.count(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_total_uses_snapshot_prices() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        cart.add(snapshot(1, 15_000));
        cart.add(snapshot(2, 32_500));
        assert_eq!(cart.total(), Price::from_rupiah(62_500));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_stored_cart_round_trips() {
        let mut cart = Cart::default();
        cart.add(snapshot(1, 15_000));
        cart.update_qty(ProductId::new(1), 2);
        let stored = serde_json::to_value(&cart).unwrap();
        assert!(stored.is_array());
        let back: Cart = serde_json::from_value(stored).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_malformed_cart_is_an_error() {
        let value = serde_json::json!({"not": "a cart"});
        assert!(serde_json::from_value::<Cart>(value).is_err());
        let value = serde_json::json!([{"product": 3, "quantity": "many"}]);
        assert!(serde_json::from_value::<Cart>(value).is_err());
    }

    #[test]
    fn test_stored_cart_is_normalised() {
        let item = serde_json::to_value(snapshot(1, 10_000)).unwrap();
        let value = serde_json::json!([
            {"product": item, "quantity": 0},
            {"product": item, "quantity": 2},
        ]);
        let cart: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_toggle_favorite_is_symmetric() {
        let mut favorites = Favorites::default();
        assert!(favorites.toggle(snapshot(1, 15_000)));
        assert!(favorites.contains(ProductId::new(1)));
        assert!(!favorites.toggle(snapshot(1, 15_000)));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_remove_favorite_by_id() {
        let mut favorites = Favorites::default();
        favorites.toggle(snapshot(1, 15_000));
        favorites.toggle(snapshot(2, 20_000));
        assert!(favorites.remove(ProductId::new(1)));
        assert!(!favorites.remove(ProductId::new(1)));
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains(ProductId::new(2)));
    }

    #[test]
    fn test_order_history_prepends_and_caps() {
        let mut history = OrderHistory::default();
        for n in 0..(ORDER_HISTORY_LIMIT + 5) {
            history.record(OrderHistoryEntry {
                tracking_code: format!("CSK-AAAA-{n:04}"),
                total: Price::from_rupiah(1_000),
                item_count: 1,
                created_at: Utc::now(),
            });
        }
        assert_eq!(history.entries().len(), ORDER_HISTORY_LIMIT);
        assert_eq!(
            history.entries().first().unwrap().tracking_code,
            format!("CSK-AAAA-{:04}", ORDER_HISTORY_LIMIT + 4)
        );
    }
}
