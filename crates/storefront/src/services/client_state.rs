//! Visitor-local lists persisted in the session.
//!
//! Each list is stored as plain JSON under a fixed key. Anything that fails
//! to load (a store error or JSON of the wrong shape) is treated as an empty
//! list so a corrupted session never breaks the storefront.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use cooskie_core::cart::{CART_KEY, Cart, FAVORITES_KEY, Favorites, ORDERS_KEY, OrderHistory};

/// Session read/write failure.
pub type SessionError = tower_sessions::session::Error;

async fn load<T>(session: &Session, key: &'static str) -> T
where
    T: DeserializeOwned + Default,
{
    let value = match session.get::<serde_json::Value>(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read visitor storage");
            return T::default();
        }
    };

    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Discarding malformed visitor storage");
        T::default()
    })
}

async fn save<T: Serialize + Sync>(
    session: &Session,
    key: &'static str,
    value: &T,
) -> Result<(), SessionError> {
    session.insert(key, value).await
}

/// Load the cart.
pub async fn load_cart(session: &Session) -> Cart {
    load(session, CART_KEY).await
}

/// Persist the cart.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), SessionError> {
    save(session, CART_KEY, cart).await
}

/// Load the favorites list.
pub async fn load_favorites(session: &Session) -> Favorites {
    load(session, FAVORITES_KEY).await
}

/// Persist the favorites list.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn save_favorites(session: &Session, favorites: &Favorites) -> Result<(), SessionError> {
    save(session, FAVORITES_KEY, favorites).await
}

/// Load the order-history cache.
pub async fn load_orders(session: &Session) -> OrderHistory {
    load(session, ORDERS_KEY).await
}

/// Persist the order-history cache.
///
/// # Errors
///
/// Returns the session store error if the write fails.
pub async fn save_orders(session: &Session, history: &OrderHistory) -> Result<(), SessionError> {
    save(session, ORDERS_KEY, history).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use cooskie_core::cart::ProductSnapshot;
    use cooskie_core::{Price, ProductCategory, ProductId};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn product(id: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: "Nastar".into(),
            slug: "nastar".into(),
            price: Price::from_rupiah(85_000),
            image_url: None,
            category: ProductCategory::Cookies,
        }
    }

    #[tokio::test]
    async fn test_missing_keys_load_empty() {
        let session = session();
        assert!(load_cart(&session).await.is_empty());
        assert!(load_favorites(&session).await.is_empty());
        assert!(load_orders(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_cart_persists_across_loads() {
        let session = session();
        let mut cart = load_cart(&session).await;
        cart.add(product(1));
        cart.add(product(1));
        save_cart(&session, &cart).await.unwrap();

        let reloaded = load_cart(&session).await;
        assert_eq!(reloaded.count(), 2);
        assert_eq!(reloaded.total(), Price::from_rupiah(170_000));
    }

    #[tokio::test]
    async fn test_malformed_cart_loads_empty() {
        let session = session();
        session
            .insert(CART_KEY, serde_json::json!({"items": "garbage"}))
            .await
            .unwrap();
        assert!(load_cart(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_favorites_load_empty() {
        let session = session();
        session.insert(FAVORITES_KEY, 42).await.unwrap();
        assert!(load_favorites(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_lists_are_independent() {
        let session = session();
        let mut favorites = Favorites::default();
        favorites.toggle(product(3));
        save_favorites(&session, &favorites).await.unwrap();

        assert!(load_cart(&session).await.is_empty());
        assert!(load_favorites(&session).await.contains(ProductId::new(3)));
    }
}
