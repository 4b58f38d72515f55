//! Cart models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use melula_core::{CartItemId, ProductId, UserId, VariantId};

use super::product::Product;

/// A cart line: one (product, variant) per user, merged on duplicate adds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with live product data.
///
/// Prices shown here are the product's current prices, not a frozen
/// snapshot; the snapshot only happens at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWithProduct {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
    pub product: Product,
}

/// Payload for `POST /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Payload for `PUT /api/cart/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItem {
    pub quantity: i32,
}
