//! Address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use melula_core::AddressId;

use crate::db::AddressRepository;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::address::{Address, CreateAddress, UpdateAddress};
use crate::state::AppState;

/// List the authenticated user's addresses.
#[instrument(skip_all)]
pub async fn index(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(addresses))
}

/// Create an address.
#[instrument(skip_all)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<CreateAddress>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Update an address.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(input): Json<UpdateAddress>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &input)
        .await?;
    Ok(Json(address))
}

/// Delete an address. Orders keep their own snapshot.
#[instrument(skip_all, fields(address_id = %id))]
pub async fn remove(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
