//! Checkout and payment-proof upload.

use chrono::Utc;
use sqlx::PgPool;

use cooskie_core::cart::Cart;
use cooskie_core::checkout::{CheckoutError, CheckoutForm, NewOrder};
use cooskie_core::payment::{PaymentRuleError, check_upload};
use cooskie_core::storage::ObjectKey;
use cooskie_core::tracking::TrackingCode;
use cooskie_core::{OrderId, Price};

use super::storage::{StorageError, UploadStore};
use crate::db::{OrderRepository, OutletRepository, RepositoryError};

/// Attempts at finding an unused tracking code before giving up.
const MAX_TRACKING_CODE_ATTEMPTS: usize = 5;

/// Errors from order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The checkout form or cart was invalid.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The payment workflow refused the upload.
    #[error(transparent)]
    Payment(#[from] PaymentRuleError),

    /// The uploaded file was refused or could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No order has that tracking code.
    #[error("order not found")]
    NotFound,

    /// Every generated tracking code collided.
    #[error("could not allocate a unique tracking code")]
    TrackingCodesExhausted,

    /// A concurrent change won.
    #[error("{0}")]
    Conflict(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl OrderError {
    /// Whether the message is safe and useful to show the visitor.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Checkout(_)
                | Self::Payment(_)
                | Self::Storage(StorageError::Rejected(_))
                | Self::NotFound
                | Self::Conflict(_)
        )
    }
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub tracking_code: TrackingCode,
    pub total: Price,
    pub item_count: u32,
}

/// Storefront order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    outlets: OutletRepository<'a>,
    uploads: &'a UploadStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, uploads: &'a UploadStore) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            outlets: OutletRepository::new(pool),
            uploads,
        }
    }

    /// Validate the checkout form and write the order from the cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Checkout` for invalid input or an empty cart,
    /// `OrderError::TrackingCodesExhausted` if every code collided, and
    /// `OrderError::Repository` if the write fails.
    pub async fn place_order(
        &self,
        form: &CheckoutForm,
        cart: &Cart,
    ) -> Result<PlacedOrder, OrderError> {
        let customer = form.validate()?;
        if let Some(outlet_id) = customer.fulfillment.outlet_id()
            && !self.outlets.exists(outlet_id).await?
        {
            return Err(CheckoutError::UnknownOutlet.into());
        }

        let order = NewOrder::from_cart(customer, cart, TrackingCode::generate())?;
        let (id, order) =
            insert_with_fresh_codes(&self.orders, order, MAX_TRACKING_CODE_ATTEMPTS).await?;

        tracing::info!(
            order_id = %id,
            tracking_code = %order.tracking_code,
            total = order.total.as_rupiah(),
            "Order placed"
        );

        Ok(PlacedOrder {
            id,
            item_count: order.item_count(),
            total: order.total,
            tracking_code: order.tracking_code,
        })
    }

    /// Store a payment proof for the order with `code`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown code, `OrderError::Payment`
    /// when the order no longer accepts a proof, `OrderError::Storage` when the
    /// file is refused, and `OrderError::Conflict` when a concurrent upload won.
    pub async fn upload_payment_proof(
        &self,
        code: &TrackingCode,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ObjectKey, OrderError> {
        let gate = self
            .orders
            .upload_gate(code.as_str())
            .await?
            .ok_or(OrderError::NotFound)?;
        check_upload(gate.status, gate.payment)?;

        let key = self
            .uploads
            .put_image(content_type, bytes, |kind| {
                ObjectKey::payment_proof(gate.order_id, kind, Utc::now())
            })
            .await?;

        if let Err(e) = self
            .orders
            .insert_payment(gate.order_id, &key.public_url())
            .await
        {
            let path = self.uploads.root().join(key.relative_path());
            if let Err(io) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %io, "Failed to remove orphaned proof");
            }
            return Err(e.into());
        }

        tracing::info!(order_id = %gate.order_id, key = %key.key, "Payment proof uploaded");
        Ok(key)
    }
}

/// Writes a new order; a taken tracking code is `RepositoryError::Conflict`.
trait OrderWriter {
    async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError>;
}

impl OrderWriter for OrderRepository<'_> {
    async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        OrderRepository::create(self, order).await
    }
}

/// Write `order`, swapping in a fresh tracking code after each collision.
async fn insert_with_fresh_codes<W: OrderWriter>(
    writer: &W,
    mut order: NewOrder,
    attempts: usize,
) -> Result<(OrderId, NewOrder), OrderError> {
    for attempt in 1..=attempts {
        match writer.create(&order).await {
            Ok(id) => return Ok((id, order)),
            Err(RepositoryError::Conflict(_)) => {
                tracing::warn!(
                    attempt,
                    tracking_code = %order.tracking_code,
                    "Tracking code collision, regenerating"
                );
                order = order.with_tracking_code(TrackingCode::generate());
            }
            Err(e) => return Err(OrderError::Repository(e)),
        }
    }
    Err(OrderError::TrackingCodesExhausted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use cooskie_core::cart::ProductSnapshot;
    use cooskie_core::{DeliveryType, ProductCategory, ProductId};

    use super::*;

    fn order() -> NewOrder {
        let form = CheckoutForm {
            name: "Dewi".into(),
            phone: "081122334455".into(),
            email: "dewi@example.com".into(),
            delivery_type: DeliveryType::Delivery,
            outlet_id: String::new(),
            address: "Jl. Braga 5".into(),
        };
        let mut cart = Cart::default();
        cart.add(ProductSnapshot {
            id: ProductId::new(1),
            name: "Kastengel".into(),
            slug: "kastengel".into(),
            price: Price::from_rupiah(90_000),
            image_url: None,
            category: ProductCategory::Cookies,
        });
        NewOrder::from_cart(form.validate().unwrap(), &cart, TrackingCode::generate()).unwrap()
    }

    /// Replays scripted results and records the codes it was offered.
    struct ScriptedWriter {
        results: RefCell<Vec<Result<OrderId, RepositoryError>>>,
        seen: RefCell<Vec<TrackingCode>>,
    }

    impl ScriptedWriter {
        fn new(mut results: Vec<Result<OrderId, RepositoryError>>) -> Self {
            results.reverse();
            Self {
                results: RefCell::new(results),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.borrow().len()
        }
    }

    impl OrderWriter for ScriptedWriter {
        async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
            self.seen.borrow_mut().push(order.tracking_code.clone());
            tokio::task::yield_now().await;
            self.results
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(RepositoryError::NotFound))
        }
    }

    fn collision() -> Result<OrderId, RepositoryError> {
        Err(RepositoryError::Conflict("tracking code already exists".into()))
    }

    fn assert_writer<W: OrderWriter>() {}

    #[test]
    fn test_repository_writes_orders() {
        assert_writer::<OrderRepository<'static>>();
    }

    #[tokio::test]
    async fn test_collision_regenerates_code() {
        let writer = ScriptedWriter::new(vec![collision(), collision(), Ok(OrderId::new(77))]);
        let (id, placed) = insert_with_fresh_codes(&writer, order(), 5).await.unwrap();

        assert_eq!(id, OrderId::new(77));
        assert_eq!(writer.calls(), 3);
        assert_eq!(writer.seen.borrow().last(), Some(&placed.tracking_code));
        assert!(TrackingCode::parse(placed.tracking_code.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let writer = ScriptedWriter::new(vec![collision(), collision(), Ok(OrderId::new(1))]);
        let result = insert_with_fresh_codes(&writer, order(), 2).await;
        assert!(matches!(result, Err(OrderError::TrackingCodesExhausted)));
        assert_eq!(writer.calls(), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let writer = ScriptedWriter::new(vec![
            Err(RepositoryError::DataCorruption("order item quantity 4294967295".into())),
            Ok(OrderId::new(1)),
        ]);
        let result = insert_with_fresh_codes(&writer, order(), 5).await;
        assert!(matches!(
            result,
            Err(OrderError::Repository(RepositoryError::DataCorruption(_)))
        ));
        assert_eq!(writer.calls(), 1);
    }

    #[test]
    fn test_user_facing_errors() {
        assert!(OrderError::from(CheckoutError::EmptyCart).is_user_facing());
        assert!(OrderError::NotFound.is_user_facing());
        assert!(!OrderError::TrackingCodesExhausted.is_user_facing());
        assert!(
            !OrderError::Repository(RepositoryError::DataCorruption("x".into())).is_user_facing()
        );
    }
}
