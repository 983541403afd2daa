//! Dashboard figures.

use cooskie_core::Price;

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub products: i64,
    pub orders: i64,
    pub users: i64,
    /// Σ totals of shipped and completed orders.
    pub revenue: Price,
}
