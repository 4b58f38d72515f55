//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use melula_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::state::AppState;

/// List active products with catalog filters.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Get one product.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".to_owned()))?;

    Ok(Json(product))
}

/// Create a product (admin).
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_owned()));
    }
    if input.price.is_sign_negative() {
        return Err(ApiError::Validation("price must not be negative".to_owned()));
    }
    if input.stock < 0 {
        return Err(ApiError::Validation("stock must not be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product (admin).
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if let Some(price) = input.price
        && price.is_sign_negative()
    {
        return Err(ApiError::Validation("price must not be negative".to_owned()));
    }
    if let Some(stock) = input.stock
        && stock < 0
    {
        return Err(ApiError::Validation("stock must not be negative".to_owned()));
    }

    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(product))
}

/// Soft-delete a product (admin).
#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
