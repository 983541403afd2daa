//! Dashboard aggregates.

use sqlx::PgPool;

use cooskie_core::{OrderStatus, Price};

use super::RepositoryError;
use crate::models::DashboardStats;

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    products: i64,
    orders: i64,
    users: i64,
    revenue: i64,
}

pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Product, order and user counts plus revenue from orders whose status
    /// counts towards it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let revenue_statuses: Vec<&str> = OrderStatus::ALL
            .iter()
            .filter(|s| s.counts_as_revenue())
            .map(OrderStatus::as_str)
            .collect();

        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM orders) AS orders,
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders WHERE status = ANY($1)) AS revenue
            ",
        )
        .bind(revenue_statuses)
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            products: row.products,
            orders: row.orders,
            users: row.users,
            revenue: Price::from_rupiah(row.revenue),
        })
    }
}
