//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use melula_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::product::{Category, CreateCategory, UpdateCategory};
use crate::state::AppState;

/// List categories.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Create a category (admin).
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_owned()));
    }

    let category = CategoryRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (admin).
#[instrument(skip_all, fields(category_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(input): Json<UpdateCategory>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(category))
}

/// Delete a category (admin).
#[instrument(skip_all, fields(category_id = %id))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
