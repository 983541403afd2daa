//! Outlet repository: pickup point CRUD.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cooskie_core::OutletId;

use super::{RepositoryError, contains_pattern};
use crate::models::{Outlet, OutletInput};

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
    created_at: DateTime<Utc>,
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
            created_at: row.created_at,
        }
    }
}

/// Repository for outlet CRUD.
pub struct OutletRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OutletRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List outlets newest first, optionally matching `search` in the name or
    /// address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Outlet>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, OutletRow>(
            r"
            SELECT id, name, address, phone, hours, lat, lng, image_url, created_at
            FROM outlets
            WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR address ILIKE $1)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Outlet::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OutletId) -> Result<Option<Outlet>, RepositoryError> {
        let row = sqlx::query_as::<_, OutletRow>(
            r"
            SELECT id, name, address, phone, hours, lat, lng, image_url, created_at
            FROM outlets
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Outlet::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        input: &OutletInput,
        image_url: Option<&str>,
    ) -> Result<OutletId, RepositoryError> {
        let (lat, lng) = input.coordinates.unzip();
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO outlets (name, address, phone, hours, lat, lng, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.phone.as_deref())
        .bind(input.hours.as_deref())
        .bind(lat)
        .bind(lng)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(OutletId::new(id))
    }

    /// Insert unless an outlet with the same name exists. Used by catalog
    /// seeding; returns whether a row was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_if_absent(
        &self,
        input: &OutletInput,
        image_url: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let (lat, lng) = input.coordinates.unzip();
        let result = sqlx::query(
            r"
            INSERT INTO outlets (name, address, phone, hours, lat, lng, image_url)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM outlets WHERE name = $1)
            ",
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.phone.as_deref())
        .bind(input.hours.as_deref())
        .bind(lat)
        .bind(lng)
        .bind(image_url)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update an outlet. The image is only replaced when `image_url` is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the outlet does not exist.
    pub async fn update(
        &self,
        id: OutletId,
        input: &OutletInput,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let (lat, lng) = input.coordinates.unzip();
        let result = sqlx::query(
            r"
            UPDATE outlets
            SET name = $2, address = $3, phone = $4, hours = $5, lat = $6, lng = $7,
                image_url = COALESCE($8, image_url)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.phone.as_deref())
        .bind(input.hours.as_deref())
        .bind(lat)
        .bind(lng)
        .bind(image_url)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an outlet, returning its image URL.
    ///
    /// Orders placed for pickup there keep their history; their outlet
    /// reference is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the outlet does not exist.
    pub async fn delete(&self, id: OutletId) -> Result<Option<String>, RepositoryError> {
        let deleted: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM outlets WHERE id = $1 RETURNING image_url")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        deleted.ok_or(RepositoryError::NotFound)
    }
}
