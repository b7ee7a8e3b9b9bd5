use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, ValidationErrors},
    models::user::Email,
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BusinessReview {
    pub id: i32,
    pub user_email: String,
    pub business_uen: String,
    pub rating: i32,
    pub body: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_email: Email,
    pub business_uen: String,
    pub rating: i32,
    pub body: String,
}
impl NewReview {
    pub fn new(input: ReviewInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let user_email = match Email::from(&input.user_email) {
            Ok(email) => email,
            Err(e) => {
                errors.add("user_email", e);
                Email("".to_string())
            }
        };

        let business_uen = input.business_uen.trim().to_string();
        if business_uen.is_empty() || business_uen.len() > 20 {
            errors.add("business_uen", String::from("UEN must be 1 to 20 characters."));
        }

        if !(1..=5).contains(&input.rating) {
            errors.add("rating", String::from("Rating must be between 1 and 5."));
        }

        if input.body.trim().is_empty() {
            errors.add("body", String::from("Review body shouldn't be empty."));
        }

        if errors.is_empty() {
            Ok(NewReview {
                user_email,
                business_uen,
                rating: input.rating,
                body: input.body,
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub user_email: String,
    pub business_uen: String,
    pub rating: i32,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQueryParams {
    pub uen: String,
}
