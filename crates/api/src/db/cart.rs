//! Cart repository.
//!
//! A cart holds at most one line per (user, product, variant); adding the
//! same product again increments the existing line instead of inserting a
//! second one. The merge is an upsert against the line's unique index, so
//! concurrent adds can't race into duplicates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use melula_core::{CartItemId, CategoryId, ProductId, UserId, VariantId};

use super::RepositoryError;
use crate::models::cart::{AddToCart, CartItem, CartItemWithProduct};
use crate::models::product::Product;

const CART_COLUMNS: &str = "id, user_id, product_id, variant_id, quantity, added_at";

/// Internal row type for cart items.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

/// Internal row type for cart items joined with live product data.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    quantity: i32,
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

impl From<CartLineRow> for CartItemWithProduct {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
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

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's cart, newest line first, joined with current product
    /// data. Prices here are live until checkout freezes them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItemWithProduct>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            "SELECT ci.id, ci.user_id, ci.product_id, ci.variant_id, ci.quantity, ci.added_at,
                    p.name AS p_name, p.description AS p_description, p.price AS p_price,
                    p.original_price AS p_original_price, p.sku AS p_sku,
                    p.category_id AS p_category_id, p.images AS p_images, p.stock AS p_stock,
                    p.features AS p_features, p.specifications AS p_specifications,
                    p.rating AS p_rating, p.review_count AS p_review_count,
                    p.is_active AS p_is_active, p.created_at AS p_created_at,
                    p.updated_at AS p_updated_at
             FROM cart_items ci
             INNER JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = $1
             ORDER BY ci.added_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItemWithProduct::from).collect())
    }

    /// Add a product to the cart, merging with an existing line for the same
    /// (product, variant) by incrementing its quantity.
    ///
    /// The merge is a single upsert against the line's unique index, so
    /// concurrent adds of the same product can't race into duplicate lines
    /// or a constraint error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// is inactive, `RepositoryError::Database` otherwise.
    pub async fn add(&self, user_id: UserId, input: &AddToCart) -> Result<CartItem, RepositoryError> {
        let product_exists: Option<(ProductId,)> =
            sqlx::query_as("SELECT id FROM products WHERE id = $1 AND is_active = TRUE")
                .bind(input.product_id)
                .fetch_optional(self.pool)
                .await?;

        if product_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        // The unique index is partial (variant_id nullable), so the conflict
        // target differs between variant and no-variant lines.
        let row: CartItemRow = if input.variant_id.is_some() {
            sqlx::query_as(&format!(
                "INSERT INTO cart_items (user_id, product_id, variant_id, quantity)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (user_id, product_id, variant_id) WHERE variant_id IS NOT NULL
                 DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
                 RETURNING {CART_COLUMNS}"
            ))
            .bind(user_id)
            .bind(input.product_id)
            .bind(input.variant_id)
            .bind(input.quantity)
            .fetch_one(self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "INSERT INTO cart_items (user_id, product_id, quantity)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (user_id, product_id) WHERE variant_id IS NULL
                 DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
                 RETURNING {CART_COLUMNS}"
            ))
            .bind(user_id)
            .bind(input.product_id)
            .bind(input.quantity)
            .fetch_one(self.pool)
            .await?
        };

        Ok(row.into())
    }

    /// Overwrite a cart line's quantity. The line must belong to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line exists for this
    /// user.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let row: Option<CartItemRow> = sqlx::query_as(&format!(
            "UPDATE cart_items SET quantity = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {CART_COLUMNS}"
        ))
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartItem::from).ok_or(RepositoryError::NotFound)
    }

    /// Remove one cart line. Idempotent: removing a line that doesn't exist
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove every line of a user's cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
