//! Product repository.
//!
//! Catalog reads filter to active products; admin paths can see everything.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder};

use melula_core::{CategoryId, ProductId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::product::{CreateProduct, Product, ProductFilter, SortOrder, UpdateProduct};

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, sku, category_id, \
     images, stock, features, specifications, rating, review_count, is_active, \
     created_at, updated_at";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub(crate) id: ProductId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) price: Decimal,
    pub(crate) original_price: Option<Decimal>,
    pub(crate) sku: String,
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) images: Vec<String>,
    pub(crate) stock: i32,
    pub(crate) features: Vec<String>,
    pub(crate) specifications: serde_json::Value,
    pub(crate) rating: Decimal,
    pub(crate) review_count: i32,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            sku: row.sku,
            category_id: row.category_id,
            images: row.images,
            stock: row.stock,
            features: row.features,
            specifications: row.specifications,
            rating: row.rating,
            review_count: row.review_count,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products with catalog filters applied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = TRUE"
        ));

        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(search) = &filter.search {
            qb.push(" AND name ILIKE ").push_bind(format!("%{search}%"));
        }
        if let Some(min_price) = filter.min_price {
            qb.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            qb.push(" AND price <= ").push_bind(max_price);
        }

        if let Some(sort_by) = filter.sort_by {
            qb.push(" ORDER BY ");
            qb.push(sort_by.column());
            qb.push(" ");
            qb.push(filter.sort_order.unwrap_or(SortOrder::Asc).sql());
        } else {
            qb.push(" ORDER BY created_at DESC");
        }

        qb.push(" LIMIT ").push_bind(filter.limit.unwrap_or(20));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0));

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by ID (active or not).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get a product by SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"
        ))
        .bind(sku)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Create a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU is taken.
    pub async fn create(&self, input: &CreateProduct) -> Result<Product, RepositoryError> {
        let specifications = input
            .specifications
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products
                 (name, description, price, original_price, sku, category_id,
                  images, stock, features, specifications)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.original_price)
        .bind(&input.sku)
        .bind(input.category_id)
        .bind(&input.images)
        .bind(input.stock)
        .bind(&input.features)
        .bind(specifications)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "sku already exists"))?;

        Ok(row.into())
    }

    /// Apply a partial update to a product (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProduct,
    ) -> Result<Product, RepositoryError> {
        let mut qb = QueryBuilder::new("UPDATE products SET updated_at = now()");

        if let Some(name) = &input.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &input.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(price) = input.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(original_price) = input.original_price {
            qb.push(", original_price = ").push_bind(original_price);
        }
        if let Some(category_id) = input.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        if let Some(images) = &input.images {
            qb.push(", images = ").push_bind(images);
        }
        if let Some(stock) = input.stock {
            qb.push(", stock = ").push_bind(stock);
        }
        if let Some(features) = &input.features {
            qb.push(", features = ").push_bind(features);
        }
        if let Some(specifications) = &input.specifications {
            qb.push(", specifications = ").push_bind(specifications);
        }
        if let Some(is_active) = input.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        let row: Option<ProductRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a product: it disappears from the catalog but stays
    /// referenced by past orders and reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List every product, active or not (admin export).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
