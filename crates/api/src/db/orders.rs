//! Order repository: reads, status transitions, payment settlement.
//!
//! Order *placement* is the multi-statement write unit of the system and
//! lives in [`crate::services::orders`]; this module owns everything that
//! happens to an order after it exists. Status updates are compare-and-set
//! against the expected current value so concurrent transitions can't
//! leapfrog the state machine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use melula_core::{
    CategoryId, OrderId, OrderItemId, OrderNumber, OrderStatus, PaymentStatus, ProductId, UserId,
    VariantId,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderItemWithProduct, OrderWithItems, ShippingAddress};
use crate::models::product::Product;

pub(crate) const ORDER_COLUMNS: &str = "id, order_number, user_id, status, payment_status, \
     payment_method, payment_intent_id, subtotal, tax, shipping, total, shipping_address, \
     created_at, updated_at";

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: OrderId,
    order_number: OrderNumber,
    user_id: UserId,
    status: OrderStatus,
    payment_status: PaymentStatus,
    payment_method: String,
    payment_intent_id: Option<String>,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    shipping_address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid shipping address snapshot: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            status: row.status,
            payment_status: row.payment_status,
            payment_method: row.payment_method,
            payment_intent_id: row.payment_intent_id,
            subtotal: row.subtotal,
            tax: row.tax,
            shipping: row.shipping,
            total: row.total,
            shipping_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for order items joined with current product data.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    quantity: i32,
    price: Decimal,
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

impl From<OrderLineRow> for OrderItemWithProduct {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
            price: row.price,
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

const ORDER_LINE_SELECT: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.variant_id, oi.quantity, oi.price,
            p.name AS p_name, p.description AS p_description, p.price AS p_price,
            p.original_price AS p_original_price, p.sku AS p_sku,
            p.category_id AS p_category_id, p.images AS p_images, p.stock AS p_stock,
            p.features AS p_features, p.specifications AS p_specifications,
            p.rating AS p_rating, p.review_count AS p_review_count,
            p.is_active AS p_is_active, p.created_at AS p_created_at,
            p.updated_at AS p_updated_at
     FROM order_items oi
     INNER JOIN products p ON p.id = oi.product_id";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get one order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if the stored address snapshot can't be decoded.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = Order::try_from(row)?;
        let items = self.items_for(&[order.id]).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// List orders with items, newest first. `user_id = None` means all
    /// users (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        user_id: Option<UserId>,
        status: Option<OrderStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"
        ));

        if let Some(user_id) = user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = offset {
            qb.push(" OFFSET ").push_bind(offset);
        }

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let orders: Vec<Order> = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<_, _>>()?;

        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let mut by_order: HashMap<OrderId, Vec<OrderItemWithProduct>> = HashMap::new();
        for item in self.items_for(&ids).await? {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = by_order.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }

    /// Transition an order's status, compare-and-set against the status the
    /// caller validated the transition from.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order's status changed
    /// since it was read, `RepositoryError::NotFound` if the order is gone.
    pub async fn set_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Order::try_from(row)?),
            None => {
                let exists: Option<(OrderId,)> =
                    sqlx::query_as("SELECT id FROM orders WHERE id = $1")
                        .bind(id)
                        .fetch_optional(self.pool)
                        .await?;
                if exists.is_some() {
                    Err(RepositoryError::Conflict(
                        "order status changed concurrently".to_owned(),
                    ))
                } else {
                    Err(RepositoryError::NotFound)
                }
            }
        }
    }

    /// Settle an order's payment. Only a `pending` payment can settle, and
    /// it settles exactly once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the payment already settled,
    /// `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "UPDATE orders
             SET payment_status = $2,
                 payment_intent_id = COALESCE($3, payment_intent_id),
                 updated_at = now()
             WHERE id = $1 AND payment_status = 'pending'
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(transaction_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Order::try_from(row)?),
            None => {
                let exists: Option<(OrderId,)> =
                    sqlx::query_as("SELECT id FROM orders WHERE id = $1")
                        .bind(id)
                        .fetch_optional(self.pool)
                        .await?;
                if exists.is_some() {
                    Err(RepositoryError::Conflict(
                        "payment already settled".to_owned(),
                    ))
                } else {
                    Err(RepositoryError::NotFound)
                }
            }
        }
    }

    /// Fetch items (with product data) for a set of orders.
    async fn items_for(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItemWithProduct>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<uuid::Uuid> = order_ids.iter().map(|id| id.as_uuid()).collect();
        let rows: Vec<OrderLineRow> =
            sqlx::query_as(&format!("{ORDER_LINE_SELECT} WHERE oi.order_id = ANY($1)"))
                .bind(&ids)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(OrderItemWithProduct::from).collect())
    }
}
