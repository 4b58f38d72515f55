//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use melula_core::ProductId;

use crate::db::ReviewRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::review::{CreateReview, Review, ReviewWithAuthor};
use crate::state::AppState;

/// List a product's reviews.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn for_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<ReviewWithAuthor>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;
    Ok(Json(reviews))
}

/// Create a review; the product's rating aggregates update atomically.
#[instrument(skip_all)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReview>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&input.rating) {
        return Err(ApiError::Validation(
            "rating must be between 1 and 5".to_owned(),
        ));
    }

    let review = ReviewRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}
