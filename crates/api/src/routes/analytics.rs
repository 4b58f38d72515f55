//! Visitor analytics route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::VisitorRepository;
use crate::error::Result;
use crate::state::AppState;

/// Response for `GET /api/analytics/visitors`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub unique_visitors: i64,
    pub total_visits: i64,
}

/// Visitor counters collected by the tracking middleware.
#[instrument(skip_all)]
pub async fn visitors(State(state): State<AppState>) -> Result<Json<VisitorStats>> {
    let repo = VisitorRepository::new(state.pool());
    let unique_visitors = repo.unique_count().await?;
    let total_visits = repo.total_count().await?;

    Ok(Json(VisitorStats {
        unique_visitors,
        total_visits,
    }))
}
