//! Authentication extractors.
//!
//! Token verification happens upstream (Firebase at the edge); requests
//! arrive with a bearer token plus the verified UID in the `x-firebase-uid`
//! header. These extractors resolve that identity to a local user record so
//! handlers receive a `{id, role}` user without repeating the lookup.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::UserRepository;
use crate::error::ApiError;
use crate::models::user::User;
use crate::state::AppState;

/// Header carrying the upstream-verified Firebase UID.
pub const FIREBASE_UID_HEADER: &str = "x-firebase-uid";

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let has_bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "));

        if !has_bearer {
            return Err(ApiError::Unauthorized("no token provided".to_owned()));
        }

        let firebase_uid = parts
            .headers
            .get(FIREBASE_UID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("invalid token".to_owned()))?;

        let user = UserRepository::new(state.pool())
            .get_by_firebase_uid(firebase_uid)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("user not found".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated admin user.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_owned()));
        }

        Ok(Self(user))
    }
}
