use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::{
    db_persistence::DbError,
    models::ModelError,
    handlers::{
        announcement::AnnouncementHandlerError, forum::ForumHandlerError, referral::ReferralHandlerError,
        review::ReviewHandlerError, user::UserHandlerError, voucher::VoucherHandlerError, HandlerError,
    },
    services::referral_redeemer::RedemptionError,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
    #[error("Redemption error: {0}")]
    Redemption(#[from] RedemptionError),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Validation failed")]
    ValidationErrors(ValidationErrors),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Server error: {0}")]
    Server(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(DbError::UserNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("User not found: {}", id))
            }
            AppError::Database(DbError::PostNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Forum post not found: {}", id))
            }
            AppError::Database(DbError::AnnouncementNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("Announcement not found: {}", id))
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Internal server error."),
            ),
            AppError::Handler(err) => match err {
                HandlerError::Referral(ReferralHandlerError::NotApplicable) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                HandlerError::Voucher(VoucherHandlerError::NotRedeemable(_)) => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                HandlerError::User(UserHandlerError::MissingUserId | UserHandlerError::NoFieldsToUpdate)
                | HandlerError::Forum(ForumHandlerError::InvalidInput(_))
                | HandlerError::Review(ReviewHandlerError::UnknownReviewer(_))
                | HandlerError::Announcement(AnnouncementHandlerError::NoFieldsToUpdate) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                HandlerError::QueryParams(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            },
            AppError::Redemption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Failed to redeem referral."),
            ),
            AppError::ValidationErrors(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::to_string(&errors.errors).unwrap_or_else(|_| String::from("Invalid input.")),
            ),
            AppError::Model(_) | AppError::Config(_) | AppError::Server(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Internal server error."),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            status: "fail",
            message,
        });

        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    field: String,
    message: String,
}

// Collection of validation errors
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}
impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors { errors: Vec::new() }
    }

    pub fn add(&mut self, field: &str, error: String) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
