use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::review::{handle_get_reviews, handle_submit_review},
    http_server::AppState,
};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(handle_get_reviews))
        .route("/submit-review", post(handle_submit_review))
}
