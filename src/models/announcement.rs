use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ValidationErrors};

const MAX_UEN_LEN: usize = 20;
const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BusinessAnnouncement {
    pub id: i32,
    pub business_uen: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    if title.trim().is_empty() {
        errors.add("title", String::from("Title shouldn't be empty."));
    } else if title.len() > MAX_TITLE_LEN {
        errors.add(
            "title",
            format!("Title shouldn't be longer than {} characters.", MAX_TITLE_LEN),
        );
    }
}

fn check_content(content: &str, errors: &mut ValidationErrors) {
    if content.trim().is_empty() {
        errors.add("content", String::from("Content shouldn't be empty."));
    }
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub business_uen: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}
impl NewAnnouncement {
    pub fn new(input: AnnouncementInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let business_uen = input.business_uen.trim().to_string();
        if business_uen.is_empty() || business_uen.len() > MAX_UEN_LEN {
            errors.add(
                "business_uen",
                format!("UEN must be 1 to {} characters.", MAX_UEN_LEN),
            );
        }
        check_title(&input.title, &mut errors);
        check_content(&input.content, &mut errors);

        if errors.is_empty() {
            Ok(NewAnnouncement {
                business_uen,
                title: input.title,
                content: input.content,
                image_url: input.image_url.filter(|url| !url.trim().is_empty()),
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementInput {
    pub business_uen: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAnnouncement {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}
impl UpdateAnnouncement {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.image_url.is_none()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            check_title(title, &mut errors);
        }
        if let Some(content) = &self.content {
            check_content(content, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementQueryParams {
    pub uen: Option<String>,
}
