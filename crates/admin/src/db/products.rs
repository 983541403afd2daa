//! Product repository: catalog CRUD.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cooskie_core::{Price, ProductCategory, ProductId};

use super::{RepositoryError, contains_pattern, corrupt};
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str =
    "id, name, slug, price, description, category, image_url, stock, rating, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    price: i64,
    description: String,
    category: String,
    image_url: Option<String>,
    stock: i32,
    rating: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<ProductCategory>()
            .map_err(|e| corrupt(&format!("product {}", row.id), e))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            price: Price::from_rupiah(row.price),
            description: row.description,
            category,
            image_url: row.image_url,
            stock: row.stock,
            rating: row.rating,
            created_at: row.created_at,
        })
    }
}

/// Repository for product CRUD.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products newest first, optionally matching `search` in the name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(
        &self,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, slug, price, description, category, stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price.as_rupiah())
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.stock)
        .bind(image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "a product with this slug"))?;

        Ok(ProductId::new(id))
    }

    /// Update a product. The image is only replaced when `image_url` is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $2, slug = $3, price = $4, description = $5, category = $6,
                stock = $7, image_url = COALESCE($8, image_url)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price.as_rupiah())
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.stock)
        .bind(image_url)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "a product with this slug"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert or update by slug. Used by catalog seeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(
        &self,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, slug, price, description, category, stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name,
                    price = EXCLUDED.price,
                    description = EXCLUDED.description,
                    category = EXCLUDED.category,
                    stock = EXCLUDED.stock,
                    image_url = COALESCE(EXCLUDED.image_url, products.image_url)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.price.as_rupiah())
        .bind(&input.description)
        .bind(input.category.as_str())
        .bind(input.stock)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Delete a product, returning its image URL.
    ///
    /// Past order lines keep their price; their product reference is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<Option<String>, RepositoryError> {
        let deleted: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING image_url")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        deleted.ok_or(RepositoryError::NotFound)
    }
}
