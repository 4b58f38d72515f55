//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use melula_core::CartItemId;

use crate::db::CartRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::cart::{AddToCart, CartItem, CartItemWithProduct, UpdateCartItem};
use crate::state::AppState;

/// List the authenticated user's cart with live product data.
#[instrument(skip_all)]
pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItemWithProduct>>> {
    let items = CartRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

/// Add a product to the cart, merging with an existing line.
#[instrument(skip_all)]
pub async fn add(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<AddToCart>,
) -> Result<(StatusCode, Json<CartItem>)> {
    if input.quantity < 1 {
        return Err(ApiError::Validation(
            "quantity must be at least 1".to_owned(),
        ));
    }

    let item = CartRepository::new(state.pool()).add(user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Overwrite a cart line's quantity.
#[instrument(skip_all, fields(item_id = %id))]
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(input): Json<UpdateCartItem>,
) -> Result<Json<CartItem>> {
    if input.quantity < 1 {
        return Err(ApiError::Validation(
            "quantity must be at least 1".to_owned(),
        ));
    }

    let item = CartRepository::new(state.pool())
        .update_quantity(user.id, id, input.quantity)
        .await?;
    Ok(Json(item))
}

/// Remove one cart line. Idempotent.
#[instrument(skip_all, fields(item_id = %id))]
pub async fn remove(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).remove(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Empty the cart. Idempotent.
#[instrument(skip_all)]
pub async fn clear(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
