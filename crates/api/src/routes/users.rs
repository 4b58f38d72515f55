//! User and auth route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use melula_core::Email;

use crate::db::UserRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::user::{RegisterUser, UpdateProfile, User};
use crate::state::AppState;

/// Register a new user record for an upstream identity.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterUser>,
) -> Result<Json<User>> {
    let email = Email::parse(&input.email)
        .map_err(|e| ApiError::Validation(format!("invalid email: {e}")))?;

    if input.firebase_uid.trim().is_empty() {
        return Err(ApiError::Validation("firebaseUid is required".to_owned()));
    }
    if input.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_owned()));
    }

    let user = UserRepository::new(state.pool())
        .create(&input, &email)
        .await?;

    Ok(Json(user))
}

/// Return the authenticated user.
#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Update the authenticated user's profile. Users can only touch their own.
#[instrument(skip_all)]
pub async fn update_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(input): Json<UpdateProfile>,
) -> Result<Json<User>> {
    if user.firebase_uid != uid {
        return Err(ApiError::Forbidden("cannot update another user".to_owned()));
    }

    let updated = UserRepository::new(state.pool())
        .update_profile(&uid, &input)
        .await?;

    Ok(Json(updated))
}

/// Payload for `PUT /api/users/{uid}/profile-image`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileImageRequest {
    pub profile_image: String,
}

/// Replace the authenticated user's profile image.
#[instrument(skip_all)]
pub async fn update_profile_image(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(input): Json<ProfileImageRequest>,
) -> Result<Json<User>> {
    if user.firebase_uid != uid {
        return Err(ApiError::Forbidden("cannot update another user".to_owned()));
    }

    let updated = UserRepository::new(state.pool())
        .update_profile_image(&uid, &input.profile_image)
        .await?;

    Ok(Json(updated))
}
