//! Order repository: checkout writes, tracking reads and proof uploads.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cooskie_core::checkout::NewOrder;
use cooskie_core::{DeliveryType, OrderId, OrderStatus, PaymentStatus, Price};

use super::RepositoryError;
use crate::models::{PaymentProof, TrackedItem, TrackedOrder};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TrackedOrderRow {
    id: i32,
    tracking_code: String,
    guest_name: String,
    delivery_type: String,
    outlet_name: Option<String>,
    outlet_address: Option<String>,
    address: Option<String>,
    total: i64,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct TrackedItemRow {
    product_name: Option<String>,
    image_url: Option<String>,
    quantity: i32,
    unit_price: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    image_url: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("{what}: {err}"))
}

impl TryFrom<TrackedItemRow> for TrackedItem {
    type Error = RepositoryError;

    fn try_from(row: TrackedItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_name: row.product_name,
            image_url: row.image_url,
            quantity: u32::try_from(row.quantity).map_err(|e| corrupt("order item quantity", e))?,
            unit_price: Price::from_rupiah(row.unit_price),
        })
    }
}

impl TryFrom<PaymentRow> for PaymentProof {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            image_url: row.image_url,
            status: row
                .status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("payment", e))?,
            created_at: row.created_at,
        })
    }
}

/// Order status and proof state, used to gate uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadGate {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment: Option<PaymentStatus>,
}

fn item_quantity(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::DataCorruption(format!("order item quantity {quantity}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for storefront order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert the order header and its line items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` only if the tracking code is taken.
    /// Returns `RepositoryError::DataCorruption` for a quantity the column
    /// cannot hold and `RepositoryError::Database` for any other failure;
    /// nothing is written in either case.
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customer = &order.customer;
        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (tracking_code, guest_name, phone, email, delivery_type, outlet_id, address, total, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(order.tracking_code.as_str())
        .bind(&customer.name)
        .bind(customer.phone.as_str())
        .bind(customer.email.as_str())
        .bind(customer.fulfillment.delivery_type().as_str())
        .bind(customer.fulfillment.outlet_id())
        .bind(customer.fulfillment.address())
        .bind(order.total.as_rupiah())
        .bind(OrderStatus::WaitingVerification.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "tracking code"))?;

        for item in &order.items {
            let quantity = item_quantity(item.quantity)?;
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(quantity)
            .bind(item.unit_price.as_rupiah())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(OrderId::new(order_id))
    }

    /// Look up an order by its exact tracking code, with items, outlet and
    /// payment proof.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a status column is invalid.
    pub async fn get_by_tracking_code(
        &self,
        code: &str,
    ) -> Result<Option<TrackedOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, TrackedOrderRow>(
            r"
            SELECT o.id, o.tracking_code, o.guest_name, o.delivery_type,
                   ou.name AS outlet_name, ou.address AS outlet_address,
                   o.address, o.total, o.status, o.created_at
            FROM orders o
            LEFT JOIN outlets ou ON ou.id = o.outlet_id
            WHERE o.tracking_code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, TrackedItemRow>(
            r"
            SELECT p.name AS product_name, p.image_url, oi.quantity, oi.unit_price
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<TrackedItem>, _>>()?;

        let payment = sqlx::query_as::<_, PaymentRow>(
            "SELECT image_url, status, created_at FROM payments WHERE order_id = $1",
        )
        .bind(row.id)
        .fetch_optional(self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()?;

        Ok(Some(TrackedOrder {
            id: OrderId::new(row.id),
            delivery_type: row
                .delivery_type
                .parse::<DeliveryType>()
                .map_err(|e| corrupt("order", e))?,
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("order", e))?,
            tracking_code: row.tracking_code,
            guest_name: row.guest_name,
            outlet_name: row.outlet_name,
            outlet_address: row.outlet_address,
            address: row.address,
            total: Price::from_rupiah(row.total),
            created_at: row.created_at,
            items,
            payment,
        }))
    }

    /// Current order status and proof state for a tracking code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upload_gate(&self, code: &str) -> Result<Option<UploadGate>, RepositoryError> {
        let row: Option<(i32, String, Option<String>)> = sqlx::query_as(
            r"
            SELECT o.id, o.status, p.status
            FROM orders o
            LEFT JOIN payments p ON p.order_id = o.id
            WHERE o.tracking_code = $1
            ",
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(|(id, status, payment)| {
            Ok(UploadGate {
                order_id: OrderId::new(id),
                status: status.parse().map_err(|e| corrupt("order", e))?,
                payment: payment
                    .map(|p| p.parse::<PaymentStatus>())
                    .transpose()
                    .map_err(|e| corrupt("payment", e))?,
            })
        })
        .transpose()
    }

    /// Record an uploaded proof in `waiting_verification`.
    ///
    /// The insert only happens while the order is still waiting for
    /// verification; the unique `order_id` key refuses a second proof.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a proof exists or the order moved on.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn insert_payment(
        &self,
        order_id: OrderId,
        image_url: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO payments (order_id, image_url, status, notes)
            SELECT o.id, $2, $3, 'Uploaded by customer'
            FROM orders o
            WHERE o.id = $1 AND o.status = $4
            ",
        )
        .bind(order_id)
        .bind(image_url)
        .bind(PaymentStatus::WaitingVerification.as_str())
        .bind(OrderStatus::WaitingVerification.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "payment proof"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "order is no longer waiting for payment".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversize_quantity_is_not_a_conflict() {
        assert!(matches!(item_quantity(12), Ok(12)));
        assert!(matches!(
            item_quantity(u32::MAX),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
