//! Admin route handlers: dashboard stats, data export, user management.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use melula_core::{UserId, UserRole};

use crate::db::{
    CategoryRepository, OrderRepository, ProductRepository, ReviewRepository, StatsRepository,
    UserRepository,
};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::admin::{DashboardStats, ExportData};
use crate::models::user::User;
use crate::state::AppState;

/// Dashboard headline numbers.
#[instrument(skip_all)]
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let stats = StatsRepository::new(state.pool()).dashboard().await?;
    Ok(Json(stats))
}

/// Full data export.
#[instrument(skip_all)]
pub async fn export(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ExportData>> {
    let pool = state.pool();

    let users = UserRepository::new(pool).list_all().await?;
    let products = ProductRepository::new(pool).list_all().await?;
    let categories = CategoryRepository::new(pool).list().await?;
    let orders = OrderRepository::new(pool).list(None, None, None, None).await?;
    let reviews = ReviewRepository::new(pool).list_all().await?;

    Ok(Json(ExportData {
        users,
        products,
        categories,
        orders,
        reviews,
    }))
}

/// List all users.
#[instrument(skip_all)]
pub async fn users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// Payload for `PUT /api/admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Change a user's role.
#[instrument(skip_all, fields(user_id = %id))]
pub async fn update_role(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<User>> {
    let role: UserRole = request.role.parse().map_err(ApiError::Validation)?;

    let user = UserRepository::new(state.pool())
        .update_role(id, role)
        .await?;

    Ok(Json(user))
}
