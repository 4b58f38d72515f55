//! Review repository.
//!
//! A product's `rating` and `review_count` are derived aggregates. They are
//! recomputed inside the same transaction as the review insert, in a single
//! `UPDATE ... FROM (SELECT ...)` statement, so concurrent submissions for
//! the same product serialize on the product row and no update is lost.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use melula_core::{OrderId, ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::{CreateReview, Review, ReviewAuthor, ReviewWithAuthor};

const REVIEW_COLUMNS: &str = "id, product_id, user_id, order_id, rating, title, comment, created_at";

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    order_id: Option<OrderId>,
    rating: i32,
    title: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            order_id: row.order_id,
            rating: row.rating,
            title: row.title,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for reviews joined with the author name.
#[derive(Debug, sqlx::FromRow)]
struct ReviewAuthorRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    order_id: Option<OrderId>,
    rating: i32,
    title: Option<String>,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    user_name: String,
}

impl From<ReviewAuthorRow> for ReviewWithAuthor {
    fn from(row: ReviewAuthorRow) -> Self {
        Self {
            review: Review {
                id: row.id,
                product_id: row.product_id,
                user_id: row.user_id,
                order_id: row.order_id,
                rating: row.rating,
                title: row.title,
                comment: row.comment,
                created_at: row.created_at,
            },
            user: ReviewAuthor {
                name: row.user_name,
            },
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List reviews for a product, newest first, with author names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ReviewWithAuthor>, RepositoryError> {
        let rows: Vec<ReviewAuthorRow> = sqlx::query_as(
            "SELECT r.id, r.product_id, r.user_id, r.order_id, r.rating, r.title, r.comment,
                    r.created_at, u.name AS user_name
             FROM reviews r
             INNER JOIN users u ON u.id = r.user_id
             WHERE r.product_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewWithAuthor::from).collect())
    }

    /// Insert a review and recompute the product's aggregates atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist,
    /// `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &CreateReview,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock the product row for the whole transaction. Concurrent
        // submissions for the same product serialize here, so each
        // aggregate recompute sees every previously committed review.
        let product_exists: Option<(ProductId,)> =
            sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
                .bind(input.product_id)
                .fetch_optional(&mut *tx)
                .await?;

        if product_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row: ReviewRow = sqlx::query_as(&format!(
            "INSERT INTO reviews (product_id, user_id, order_id, rating, title, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(input.product_id)
        .bind(user_id)
        .bind(input.order_id)
        .bind(input.rating)
        .bind(&input.title)
        .bind(&input.comment)
        .fetch_one(&mut *tx)
        .await?;

        // Single-statement aggregate recompute; the product row lock
        // serializes concurrent writers.
        sqlx::query(
            "UPDATE products
             SET rating = agg.avg_rating,
                 review_count = agg.review_count,
                 updated_at = now()
             FROM (
                 SELECT ROUND(AVG(rating)::numeric, 2) AS avg_rating,
                        COUNT(*)::int AS review_count
                 FROM reviews
                 WHERE product_id = $1
             ) AS agg
             WHERE id = $1",
        )
        .bind(input.product_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// List every review (admin export).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }
}
