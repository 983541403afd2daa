//! Order repository: back-office listing, status changes and proof review.
//!
//! Every write is conditional on the status the caller decided from, so two
//! admins acting on the same order cannot both succeed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cooskie_core::{DeliveryType, OrderId, OrderStatus, PaymentStatus, PhoneNumber, Price};

use super::{RepositoryError, corrupt};
use crate::models::{AdminOrder, OrderLine, OrderSummary, Payment};

const ORDER_QUERY: &str = r"
    SELECT o.id, o.tracking_code, o.guest_name, o.phone, o.email, o.delivery_type,
           ot.name AS outlet_name, o.address, o.total, o.status, o.created_at,
           p.image_url AS payment_image_url, p.status AS payment_status,
           p.notes AS payment_notes, p.created_at AS payment_created_at
    FROM orders o
    LEFT JOIN outlets ot ON ot.id = o.outlet_id
    LEFT JOIN payments p ON p.order_id = o.id
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    tracking_code: String,
    guest_name: String,
    phone: String,
    email: String,
    delivery_type: String,
    outlet_name: Option<String>,
    address: Option<String>,
    total: i64,
    status: String,
    created_at: DateTime<Utc>,
    payment_image_url: Option<String>,
    payment_status: Option<String>,
    payment_notes: Option<String>,
    payment_created_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Result<AdminOrder, RepositoryError> {
        let what = format!("order {}", self.id);

        let payment = match (
            self.payment_image_url,
            self.payment_status,
            self.payment_created_at,
        ) {
            (Some(image_url), Some(status), Some(created_at)) => Some(Payment {
                image_url,
                status: status
                    .parse::<PaymentStatus>()
                    .map_err(|e| corrupt(&what, e))?,
                notes: self.payment_notes,
                created_at,
            }),
            _ => None,
        };

        Ok(AdminOrder {
            id: OrderId::new(self.id),
            tracking_code: self.tracking_code,
            guest_name: self.guest_name,
            phone: PhoneNumber::from_stored(self.phone),
            email: self.email,
            delivery_type: self
                .delivery_type
                .parse::<DeliveryType>()
                .map_err(|e| corrupt(&what, e))?,
            outlet_name: self.outlet_name,
            address: self.address,
            total: Price::from_rupiah(self.total),
            status: self
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt(&what, e))?,
            created_at: self.created_at,
            items,
            payment,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    order_id: i32,
    product_name: Option<String>,
    quantity: i32,
    unit_price: i64,
}

impl TryFrom<LineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_name: row.product_name,
            quantity: u32::try_from(row.quantity).map_err(|e| corrupt("order item quantity", e))?,
            unit_price: Price::from_rupiah(row.unit_price),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    status: String,
    payment_status: Option<String>,
}

impl TryFrom<SummaryRow> for OrderSummary {
    type Error = RepositoryError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let what = format!("order {}", row.id);
        Ok(Self {
            id: OrderId::new(row.id),
            status: row
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt(&what, e))?,
            payment: row
                .payment_status
                .map(|s| s.parse::<PaymentStatus>())
                .transpose()
                .map_err(|e| corrupt(&what, e))?,
        })
    }
}

fn stale(id: OrderId) -> RepositoryError {
    RepositoryError::Conflict(format!("order {id} changed while you were looking at it"))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for back-office order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders newest first, with their lines and payment. `None` lists all.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<AdminOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_QUERY} ORDER BY o.created_at DESC, o.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.lines_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<AdminOrder>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_QUERY} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self
            .lines_for(&[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();

        row.into_order(items).map(Some)
    }

    /// Current order and payment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, id: OrderId) -> Result<Option<OrderSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT o.id, o.status, p.status AS payment_status
            FROM orders o
            LEFT JOIN payments p ON p.order_id = o.id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Move an order from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order is no longer in `from`.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(stale(id));
        }
        Ok(())
    }

    /// Mark the pending proof valid and move the order to `next`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if either the proof or the order
    /// is no longer waiting for verification; nothing is written then.
    pub async fn accept_payment(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query(
            r"
            UPDATE payments
            SET status = $2, notes = 'Verified by admin'
            WHERE order_id = $1 AND status = $3
            ",
        )
        .bind(id)
        .bind(PaymentStatus::Valid.as_str())
        .bind(PaymentStatus::WaitingVerification.as_str())
        .execute(&mut *tx)
        .await?;

        let order = sqlx::query(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            ",
        )
        .bind(id)
        .bind(next.as_str())
        .bind(OrderStatus::WaitingVerification.as_str())
        .execute(&mut *tx)
        .await?;

        if payment.rows_affected() == 0 || order.rows_affected() == 0 {
            return Err(stale(id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Discard the pending proof so the customer can upload again.
    /// Returns the removed proof's image URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order or proof moved on.
    pub async fn reject_payment(&self, id: OrderId) -> Result<String, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let image_url: Option<String> = sqlx::query_scalar(
            r"
            DELETE FROM payments p
            USING orders o
            WHERE p.order_id = $1 AND o.id = p.order_id
              AND p.status = $2 AND o.status = $3
            RETURNING p.image_url
            ",
        )
        .bind(id)
        .bind(PaymentStatus::WaitingVerification.as_str())
        .bind(OrderStatus::WaitingVerification.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(image_url) = image_url else {
            return Err(stale(id));
        };

        sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(OrderStatus::WaitingVerification.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(image_url)
    }

    async fn lines_for(
        &self,
        ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderLine>>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT oi.order_id, p.name AS product_name, oi.quantity, oi.unit_price
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            grouped.entry(order_id).or_default().push(row.try_into()?);
        }
        Ok(grouped)
    }
}
