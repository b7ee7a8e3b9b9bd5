use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, ValidationErrors},
    models::user::Email,
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ForumPost {
    pub id: i32,
    pub user_email: String,
    pub business_uen: Option<String>,
    pub title: Option<String>,
    pub body: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ForumReply {
    pub id: i32,
    pub post_id: i32,
    pub user_email: String,
    pub body: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForumPostWithReplies {
    #[serde(flatten)]
    pub post: ForumPost,
    pub replies: Vec<ForumReply>,
}

#[derive(Debug, Clone)]
pub struct NewForumPost {
    pub user_email: Email,
    pub business_uen: Option<String>,
    pub title: Option<String>,
    pub body: String,
}
impl NewForumPost {
    pub fn new(input: ForumPostInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let user_email = match Email::from(&input.user_email) {
            Ok(email) => email,
            Err(e) => {
                errors.add("user_email", e);
                Email("".to_string())
            }
        };

        if input.body.trim().is_empty() {
            errors.add("body", String::from("Post body shouldn't be empty."));
        }

        if let Some(title) = &input.title {
            if title.len() > 255 {
                errors.add("title", String::from("Title shouldn't be longer than 255 characters."));
            }
        }

        if errors.is_empty() {
            Ok(NewForumPost {
                user_email,
                business_uen: input.business_uen.filter(|uen| !uen.trim().is_empty()),
                title: input.title,
                body: input.body,
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForumPostInput {
    pub user_email: String,
    pub business_uen: Option<String>,
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct NewForumReply {
    pub post_id: i32,
    pub user_email: Email,
    pub body: String,
}
impl NewForumReply {
    pub fn new(input: ForumReplyInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let user_email = match Email::from(&input.user_email) {
            Ok(email) => email,
            Err(e) => {
                errors.add("user_email", e);
                Email("".to_string())
            }
        };

        if input.body.trim().is_empty() {
            errors.add("body", String::from("Reply body shouldn't be empty."));
        }

        if errors.is_empty() {
            Ok(NewForumReply {
                post_id: input.post_id,
                user_email,
                body: input.body,
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForumReplyInput {
    pub post_id: i32,
    pub user_email: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct PostLikesPayload {
    pub post_id: i32,
    pub clicked: bool,
}

#[derive(Debug, Serialize)]
pub struct PostLikesResponse {
    pub post_id: i32,
    pub like_count: i32,
}
