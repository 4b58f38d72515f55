//! Visitor tracking repository.
//!
//! Best-effort per-IP visit counters. Callers treat failures as
//! non-fatal; nothing user-facing depends on these rows.

use sqlx::PgPool;

use super::RepositoryError;

/// Repository for visitor tracking.
pub struct VisitorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitorRepository<'a> {
    /// Create a new visitor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a visit from an IP address, creating the visitor row on first
    /// sight and bumping the counter otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn track(
        &self,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO visitors (ip_address, user_agent)
             VALUES ($1, $2)
             ON CONFLICT (ip_address) DO UPDATE
             SET last_visit = now(),
                 visit_count = visitors.visit_count + 1,
                 user_agent = COALESCE(EXCLUDED.user_agent, visitors.user_agent)",
        )
        .bind(ip_address)
        .bind(user_agent)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Number of distinct IPs seen.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unique_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitors")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Total visits across all IPs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(visit_count), 0)::bigint FROM visitors")
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }
}
