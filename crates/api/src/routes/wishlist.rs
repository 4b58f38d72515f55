//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use melula_core::{ProductId, WishlistItemId};

use crate::db::WishlistRepository;
use crate::db::wishlist::WishlistItemWithProduct;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// List the authenticated user's wishlist.
#[instrument(skip_all)]
pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<WishlistItemWithProduct>>> {
    let items = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

/// Payload for `POST /api/wishlist`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWishlistRequest {
    pub product_id: ProductId,
}

/// Response for `POST /api/wishlist`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWishlistResponse {
    pub id: WishlistItemId,
}

/// Add a product to the wishlist.
#[instrument(skip_all)]
pub async fn add(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<AddWishlistRequest>,
) -> Result<(StatusCode, Json<AddWishlistResponse>)> {
    let id = WishlistRepository::new(state.pool())
        .add(user.id, input.product_id)
        .await?;
    Ok((StatusCode::CREATED, Json(AddWishlistResponse { id })))
}

/// Remove a wishlist entry. Idempotent.
#[instrument(skip_all, fields(item_id = %id))]
pub async fn remove(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<WishlistItemId>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Response for `GET /api/wishlist/check/{productId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub is_in_wishlist: bool,
}

/// Whether a product is on the user's wishlist.
#[instrument(skip_all, fields(product_id = %product_id))]
pub async fn check(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CheckResponse>> {
    let is_in_wishlist = WishlistRepository::new(state.pool())
        .contains(user.id, product_id)
        .await?;
    Ok(Json(CheckResponse { is_in_wishlist }))
}
