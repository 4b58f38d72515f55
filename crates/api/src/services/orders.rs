//! Order placement.
//!
//! Converting a cart snapshot into a placed order is the one multi-statement
//! write unit in the system. Four mutations must land together or not at
//! all: the order row, its items (with unit prices frozen as of this
//! moment), the stock decrements, and the cart clear. They run inside a
//! single transaction; any failure rolls the whole placement back, leaving
//! no order, no stock change, and an untouched cart.
//!
//! Stock decrements are conditional (`... AND stock >= quantity`, checked by
//! affected-row count), so two checkouts racing for the last unit can't both
//! win: one commits, the other fails with `InsufficientStock` and rolls
//! back. Oversell is rejected, never clamped.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use melula_core::{OrderNumber, ProductId, UserId};

use crate::db::orders::{ORDER_COLUMNS, OrderRepository, OrderRow};
use crate::db::RepositoryError;
use crate::models::order::{Order, OrderWithItems, PlaceOrderRequest};

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The request failed validation; nothing was persisted.
    #[error("invalid order input: {0}")]
    InvalidInput(String),

    /// A requested quantity exceeds the available stock; the whole
    /// placement was rolled back.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// A referenced product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Underlying storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// The order placement service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from a checkout snapshot.
    ///
    /// Validates the request, then atomically persists the order and its
    /// items, decrements stock, and clears the user's cart.
    ///
    /// # Errors
    ///
    /// - [`PlaceOrderError::InvalidInput`] if the request fails validation
    /// - [`PlaceOrderError::InsufficientStock`] if any line exceeds stock
    /// - [`PlaceOrderError::ProductNotFound`] for an unknown product
    /// - [`PlaceOrderError::Repository`] for storage failures
    ///
    /// In every error case, no partial state is left behind.
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: &PlaceOrderRequest,
    ) -> Result<OrderWithItems, PlaceOrderError> {
        validate(request)?;

        let order_number = OrderNumber::generate();
        let address_snapshot = serde_json::to_value(&request.shipping_address)
            .map_err(|e| PlaceOrderError::InvalidInput(format!("invalid shipping address: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let order_row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders
                 (order_number, user_id, payment_method, payment_intent_id,
                  subtotal, tax, shipping, total, shipping_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order_number)
        .bind(user_id)
        .bind(&request.payment_method)
        .bind(&request.payment_intent_id)
        .bind(request.subtotal)
        .bind(request.tax)
        .bind(request.shipping)
        .bind(request.total)
        .bind(&address_snapshot)
        .fetch_one(&mut *tx)
        .await?;

        let order = Order::try_from(order_row)?;

        for line in &request.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, variant_id, quantity, price)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.variant_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;

            // Conditional decrement: zero rows affected means the guard
            // failed, and dropping the transaction rolls everything back.
            let decremented = sqlx::query(
                "UPDATE products
                 SET stock = stock - $2, updated_at = now()
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                let available: Option<(i32,)> =
                    sqlx::query_as("SELECT stock FROM products WHERE id = $1")
                        .bind(line.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                return Err(match available {
                    Some((available,)) => PlaceOrderError::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available,
                    },
                    None => PlaceOrderError::ProductNotFound(line.product_id),
                });
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %user_id,
            total = %order.total,
            "order placed"
        );

        OrderRepository::new(self.pool)
            .get(order.id)
            .await?
            .ok_or(PlaceOrderError::Repository(RepositoryError::NotFound))
    }
}

/// Validate a placement request before touching the database.
fn validate(request: &PlaceOrderRequest) -> Result<(), PlaceOrderError> {
    if request.items.is_empty() {
        return Err(PlaceOrderError::InvalidInput(
            "order must contain at least one item".to_owned(),
        ));
    }

    for line in &request.items {
        if line.quantity < 1 {
            return Err(PlaceOrderError::InvalidInput(format!(
                "quantity must be at least 1 for product {}",
                line.product_id
            )));
        }
        if line.price.is_sign_negative() {
            return Err(PlaceOrderError::InvalidInput(format!(
                "price must not be negative for product {}",
                line.product_id
            )));
        }
    }

    let totals = request.totals();
    if !totals.is_non_negative() {
        return Err(PlaceOrderError::InvalidInput(
            "totals must not be negative".to_owned(),
        ));
    }
    if !totals.is_consistent() {
        return Err(PlaceOrderError::InvalidInput(
            "total must equal subtotal + tax + shipping".to_owned(),
        ));
    }

    // Recompute the subtotal from the submitted lines so a client can't
    // forge a breakdown that is internally consistent but wrong.
    let computed_subtotal: Decimal = request
        .items
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();
    if computed_subtotal != request.subtotal {
        return Err(PlaceOrderError::InvalidInput(format!(
            "subtotal {} does not match line items ({computed_subtotal})",
            request.subtotal
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use melula_core::VariantId;

    use super::*;
    use crate::models::order::{OrderLineInput, ShippingAddress};

    /// Cents-denominated decimal, scale 2.
    fn cents(n: i64) -> Decimal {
        Decimal::new(n, 2)
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Ada Lovelace".to_owned(),
            street: "1 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: "LDN".to_owned(),
            zip_code: "EC1A".to_owned(),
            country: "GB".to_owned(),
            phone: None,
        }
    }

    fn request(items: Vec<OrderLineInput>) -> PlaceOrderRequest {
        let subtotal: Decimal = items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        PlaceOrderRequest {
            items,
            shipping_address: address(),
            payment_method: "stripe".to_owned(),
            payment_intent_id: None,
            subtotal,
            tax: cents(0),
            shipping: cents(0),
            total: subtotal,
        }
    }

    fn line(quantity: i32, price: Decimal) -> OrderLineInput {
        OrderLineInput {
            product_id: melula_core::ProductId::generate(),
            quantity,
            price,
            variant_id: None,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        let req = request(vec![line(2, cents(19_99)), line(1, cents(5_00))]);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let req = request(vec![]);
        assert!(matches!(
            validate(&req),
            Err(PlaceOrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let req = request(vec![line(0, cents(19_99))]);
        assert!(matches!(
            validate(&req),
            Err(PlaceOrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let req = request(vec![line(1, cents(-1_00))]);
        assert!(matches!(
            validate(&req),
            Err(PlaceOrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inconsistent_totals() {
        let mut req = request(vec![line(1, cents(10_00))]);
        req.total = cents(11_00);
        assert!(matches!(
            validate(&req),
            Err(PlaceOrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_rejects_forged_subtotal() {
        // Internally consistent breakdown that doesn't match the lines.
        let mut req = request(vec![line(2, cents(10_00))]);
        req.subtotal = cents(1_00);
        req.total = cents(1_00);
        assert!(matches!(
            validate(&req),
            Err(PlaceOrderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_accepts_tax_and_shipping() {
        let mut req = request(vec![line(3, cents(7_50))]);
        req.tax = cents(1_86);
        req.shipping = cents(4_99);
        req.total = req.subtotal + req.tax + req.shipping;
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_validate_handles_variant_lines() {
        let mut item = line(1, cents(12_00));
        item.variant_id = Some(VariantId::generate());
        let req = request(vec![item]);
        assert!(validate(&req).is_ok());
    }
}
