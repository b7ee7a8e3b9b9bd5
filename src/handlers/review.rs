use axum::{
    extract::{self, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    handlers::{HandlerError, SuccessResponse},
    http_server::AppState,
    models::review::{BusinessReview, NewReview, ReviewInput, ReviewQueryParams},
    AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum ReviewHandlerError {
    #[error("No user with email {0}")]
    UnknownReviewer(String),
}

/// GET /reviews?uen=
pub async fn handle_get_reviews(
    State(state): State<AppState>,
    Query(params): Query<ReviewQueryParams>,
) -> Result<Json<SuccessResponse<Vec<BusinessReview>>>, AppError> {
    let uen = params.uen.trim();
    if uen.is_empty() {
        return Err(AppError::Handler(HandlerError::QueryParams(String::from(
            "uen is required",
        ))));
    }

    let reviews = state.db.reviews.find_all_by_business(uen).await?;

    Ok(SuccessResponse::new(reviews))
}

/// POST /submit-review
pub async fn handle_submit_review(
    State(state): State<AppState>,
    extract::Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<SuccessResponse<BusinessReview>>), AppError> {
    let new_review = NewReview::new(input)?;

    if state.db.users.find_by_email(&new_review.user_email.0).await?.is_none() {
        return Err(AppError::Handler(HandlerError::Review(
            ReviewHandlerError::UnknownReviewer(new_review.user_email.0),
        )));
    }

    let review = state.db.reviews.create(&new_review).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(review)))
}
