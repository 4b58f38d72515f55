//! Order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use melula_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::{ApiError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::{Order, OrderWithItems, PlaceOrderRequest};
use crate::models::user::User;
use crate::services::orders::OrderService;
use crate::services::payments::{self, PaymentError};
use crate::state::AppState;

/// Query parameters for the order listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// List orders: customers see their own, admins see everyone's.
#[instrument(skip_all)]
pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderWithItems>>> {
    let user_filter = if user.role.is_admin() {
        None
    } else {
        Some(user.id)
    };

    let orders = OrderRepository::new(state.pool())
        .list(user_filter, query.status, query.limit, query.offset)
        .await?;

    Ok(Json(orders))
}

/// Get one order; only the owner or an admin may see it.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn show(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderWithItems>> {
    let order = fetch_authorized(&state, &user, id).await?;
    Ok(Json(order))
}

/// Place an order from the submitted checkout snapshot.
#[instrument(skip_all)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let order = OrderService::new(state.pool())
        .place_order(user.id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Cancel an order. Customers may cancel while it is still `pending` or
/// `confirmed`; admins may additionally cancel a `processing` order.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn cancel(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let current = fetch_authorized(&state, &user, id).await?.order;

    let allowed = if user.role.is_admin() {
        current.status.can_transition_to(OrderStatus::Cancelled)
    } else {
        current.status.customer_cancellable()
    };

    if !allowed {
        return Err(ApiError::Validation(format!(
            "cannot cancel an order in status {}",
            current.status
        )));
    }

    let order = OrderRepository::new(state.pool())
        .set_status(id, current.status, OrderStatus::Cancelled)
        .await?;

    Ok(Json(order))
}

/// Capture the order's payment through its provider and settle
/// `paymentStatus`.
///
/// A capture the provider declines marks the order `failed` and surfaces a
/// payment error; the order itself is kept.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn capture(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let current = fetch_authorized(&state, &user, id).await?.order;

    if current.payment_status.is_settled() {
        return Err(ApiError::Validation(format!(
            "payment already settled as {}",
            current.payment_status
        )));
    }

    let intent_id = current.payment_intent_id.as_deref().ok_or_else(|| {
        ApiError::Validation("order has no payment intent to capture".to_owned())
    })?;

    let repo = OrderRepository::new(state.pool());
    let outcome = payments::capture_for_method(
        state.stripe(),
        state.paypal(),
        &current.payment_method,
        intent_id,
    )
    .await?;

    if outcome.success {
        let order = repo
            .set_payment_status(id, PaymentStatus::Paid, outcome.transaction_id.as_deref())
            .await?;
        Ok(Json(order))
    } else {
        repo.set_payment_status(id, PaymentStatus::Failed, outcome.transaction_id.as_deref())
            .await?;
        Err(ApiError::Payment(PaymentError::Provider {
            provider: "capture",
            status: 402,
            message: "capture was declined".to_owned(),
        }))
    }
}

/// Payload for `PUT /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Transition an order's status (admin). Rejects anything outside the
/// allowed transition set.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_owned()))?
        .order;

    if !current.status.can_transition_to(request.status) {
        return Err(ApiError::Validation(format!(
            "invalid status transition {} -> {}",
            current.status, request.status
        )));
    }

    let order = repo.set_status(id, current.status, request.status).await?;
    Ok(Json(order))
}

/// Fetch an order and enforce owner-or-admin access.
async fn fetch_authorized(
    state: &AppState,
    user: &User,
    id: OrderId,
) -> Result<OrderWithItems> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_owned()))?;

    if !user.role.is_admin() && order.order.user_id != user.id {
        return Err(ApiError::Forbidden("access denied".to_owned()));
    }

    Ok(order)
}
