//! User models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use melula_core::{Email, UserId, UserRole};

/// A storefront user.
///
/// Authentication itself happens upstream (Firebase); this record maps the
/// upstream identity to a local id and role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub firebase_uid: String,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub firebase_uid: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Partial profile update. Omitted fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}
