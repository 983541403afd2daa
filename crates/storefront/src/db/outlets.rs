//! Outlet repository (read-only on the storefront).

use sqlx::PgPool;

use cooskie_core::OutletId;

use super::RepositoryError;
use crate::models::Outlet;

#[derive(Debug, sqlx::FromRow)]
struct OutletRow {
    id: i32,
    name: String,
    address: String,
    phone: Option<String>,
    hours: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    image_url: Option<String>,
}

impl From<OutletRow> for Outlet {
    fn from(row: OutletRow) -> Self {
        Self {
            id: OutletId::new(row.id),
            name: row.name,
            address: row.address,
            phone: row.phone,
            hours: row.hours,
            lat: row.lat,
            lng: row.lng,
            image_url: row.image_url,
        }
    }
}

/// Repository for outlet reads.
pub struct OutletRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OutletRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All outlets, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Outlet>, RepositoryError> {
        let rows = sqlx::query_as::<_, OutletRow>(
            r"
            SELECT id, name, address, phone, hours, lat, lng, image_url
            FROM outlets
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Outlet::from).collect())
    }

    /// Whether an outlet with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: OutletId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM outlets WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
