//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use melula_core::{Email, UserId, UserRole};

use super::{RepositoryError, conflict_on_unique};
use crate::models::user::{RegisterUser, UpdateProfile, User};

const USER_COLUMNS: &str =
    "id, firebase_uid, email, name, phone, profile_image, role, created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    firebase_uid: String,
    email: Email,
    name: String,
    phone: Option<String>,
    profile_image: Option<String>,
    role: UserRole,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            firebase_uid: row.firebase_uid,
            email: row.email,
            name: row.name,
            phone: row.phone,
            profile_image: row.profile_image,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their local ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by their upstream (Firebase) identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_firebase_uid(
        &self,
        firebase_uid: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE firebase_uid = $1"
        ))
        .bind(firebase_uid)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or Firebase UID is
    /// already registered, `RepositoryError::Database` otherwise.
    pub async fn create(&self, input: &RegisterUser, email: &Email) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (firebase_uid, email, name, phone, profile_image)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&input.firebase_uid)
        .bind(email)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.profile_image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "account already exists"))?;

        Ok(row.into())
    }

    /// Update a user's own profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this Firebase UID.
    pub async fn update_profile(
        &self,
        firebase_uid: &str,
        input: &UpdateProfile,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 profile_image = COALESCE($4, profile_image),
                 updated_at = now()
             WHERE firebase_uid = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(firebase_uid)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.profile_image)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    /// Replace a user's profile image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this Firebase UID.
    pub async fn update_profile_image(
        &self,
        firebase_uid: &str,
        profile_image: &str,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET profile_image = $2, updated_at = now()
             WHERE firebase_uid = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(firebase_uid)
        .bind(profile_image)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }

    /// List all users, newest first (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Set a user's role (admin).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_role(&self, id: UserId, role: UserRole) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET role = $2, updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::from).ok_or(RepositoryError::NotFound)
    }
}
