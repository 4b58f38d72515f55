//! Wishlist repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use melula_core::{CategoryId, ProductId, UserId, WishlistItemId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::product::Product;

/// A wishlist entry joined with live product data.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemWithProduct {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
    pub product: Product,
}

#[derive(Debug, sqlx::FromRow)]
struct WishlistLineRow {
    id: WishlistItemId,
    user_id: UserId,
    product_id: ProductId,
    added_at: DateTime<Utc>,
    p_name: String,
    p_description: String,
    p_price: Decimal,
    p_original_price: Option<Decimal>,
    p_sku: String,
    p_category_id: Option<CategoryId>,
    p_images: Vec<String>,
    p_stock: i32,
    p_features: Vec<String>,
    p_specifications: serde_json::Value,
    p_rating: Decimal,
    p_review_count: i32,
    p_is_active: bool,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
}

impl From<WishlistLineRow> for WishlistItemWithProduct {
    fn from(row: WishlistLineRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            added_at: row.added_at,
            product: Product {
                id: row.product_id,
                name: row.p_name,
                description: row.p_description,
                price: row.p_price,
                original_price: row.p_original_price,
                sku: row.p_sku,
                category_id: row.p_category_id,
                images: row.p_images,
                stock: row.p_stock,
                features: row.p_features,
                specifications: row.p_specifications,
                rating: row.p_rating,
                review_count: row.p_review_count,
                is_active: row.p_is_active,
                created_at: row.p_created_at,
                updated_at: row.p_updated_at,
            },
        }
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WishlistItemWithProduct>, RepositoryError> {
        let rows: Vec<WishlistLineRow> = sqlx::query_as(
            "SELECT wi.id, wi.user_id, wi.product_id, wi.added_at,
                    p.name AS p_name, p.description AS p_description, p.price AS p_price,
                    p.original_price AS p_original_price, p.sku AS p_sku,
                    p.category_id AS p_category_id, p.images AS p_images, p.stock AS p_stock,
                    p.features AS p_features, p.specifications AS p_specifications,
                    p.rating AS p_rating, p.review_count AS p_review_count,
                    p.is_active AS p_is_active, p.created_at AS p_created_at,
                    p.updated_at AS p_updated_at
             FROM wishlist_items wi
             INNER JOIN products p ON p.id = wi.product_id
             WHERE wi.user_id = $1
             ORDER BY wi.added_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistItemWithProduct::from).collect())
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already listed,
    /// `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let product_exists: Option<(ProductId,)> =
            sqlx::query_as("SELECT id FROM products WHERE id = $1 AND is_active = TRUE")
                .bind(product_id)
                .fetch_optional(self.pool)
                .await?;

        if product_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row: (WishlistItemId,) = sqlx::query_as(
            "INSERT INTO wishlist_items (user_id, product_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "product already in wishlist"))?;

        Ok(row.0)
    }

    /// Remove a wishlist entry. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        id: WishlistItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Whether a product is on the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(WishlistItemId,)> = sqlx::query_as(
            "SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }
}
