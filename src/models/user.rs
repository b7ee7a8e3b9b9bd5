use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::errors::{AppError, ValidationErrors};

pub const MAX_REFERRAL_CODE_LEN: usize = 32;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct ReferralCode(pub String);
impl ReferralCode {
    pub fn from(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(String::from("Referral code shouldn't be empty."));
        }

        if trimmed.len() > MAX_REFERRAL_CODE_LEN {
            return Err(format!(
                "Referral code shouldn't be longer than {} characters.",
                MAX_REFERRAL_CODE_LEN
            ));
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(String::from("Invalid referral code format"));
        }

        Ok(ReferralCode(trimmed.to_string()))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(transparent)]
pub struct Email(pub String);
impl Email {
    pub fn from(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(String::from("Email shouldn't be empty."));
        }

        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
                Ok(Email(trimmed.to_lowercase()))
            }
            _ => Err(String::from("Invalid email format")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Email,
    pub email_verified: bool,
    pub image: Option<String>,
    pub has_business: Option<bool>,
    pub referral_code: Option<ReferralCode>,
    pub referred_by_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            email_verified: row.try_get("email_verified")?,
            image: row.try_get("image")?,
            has_business: row.try_get("has_business")?,
            referral_code: row.try_get("referral_code")?,
            referred_by_user_id: row.try_get("referred_by_user_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A user row as inserted by the seeding tool and tests. Real accounts come
/// from the auth provider.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: Email,
    pub referral_code: Option<ReferralCode>,
}
impl NewUser {
    pub fn new(input: NewUserInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        if input.id.trim().is_empty() || input.id.len() > 36 {
            errors.add("id", String::from("User id must be 1 to 36 characters."));
        }

        if input.name.trim().is_empty() {
            errors.add("name", String::from("Name shouldn't be empty."));
        }

        let email = match Email::from(&input.email) {
            Ok(email) => email,
            Err(e) => {
                errors.add("email", e);
                Email("".to_string())
            }
        };

        let referral_code = match input.referral_code.as_deref().map(ReferralCode::from) {
            Some(Ok(code)) => Some(code),
            Some(Err(e)) => {
                errors.add("referral_code", e);
                None
            }
            None => None,
        };

        if errors.is_empty() {
            Ok(NewUser {
                id: input.id,
                name: input.name.trim().to_string(),
                email,
                referral_code,
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewUserInput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub referral_code: Option<String>,
}

/// Profile fields a user may change. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub image: Option<String>,
}
impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}
impl UpdateProfilePayload {
    pub fn into_parts(self) -> (Option<String>, UpdateProfile) {
        let user_id = self.user_id.filter(|id| !id.trim().is_empty());
        let updates = UpdateProfile {
            name: self.name,
            image: self.image,
        };

        (user_id, updates)
    }
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub email_verified: bool,
    pub has_business: Option<bool>,
    pub referral_code: Option<String>,
    pub created_at: DateTime<Utc>,
}
impl From<User> for UserProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.0,
            image: user.image,
            email_verified: user.email_verified,
            has_business: user.has_business,
            referral_code: user.referral_code.map(|code| code.0),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReferralInfoResponse {
    pub referral_code: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_code_validation() {
        assert_eq!(ReferralCode::from(" ABC123 ").unwrap().0, "ABC123");
        assert!(ReferralCode::from("").is_err());
        assert!(ReferralCode::from("   ").is_err());
        assert!(ReferralCode::from("abc 123").is_err());
        assert!(ReferralCode::from(&"A".repeat(MAX_REFERRAL_CODE_LEN + 1)).is_err());
    }

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(Email::from("Jane@Example.com").unwrap().0, "jane@example.com");
        assert!(Email::from("not-an-email").is_err());
        assert!(Email::from("@example.com").is_err());
    }

    #[test]
    fn test_new_user_collects_all_errors() {
        let input = NewUserInput {
            id: "".to_string(),
            name: " ".to_string(),
            email: "broken".to_string(),
            referral_code: Some("bad code".to_string()),
        };

        match NewUser::new(input) {
            Err(AppError::ValidationErrors(errors)) => {
                let json = serde_json::to_string(&errors).unwrap();
                for field in ["id", "name", "email", "referral_code"] {
                    assert!(json.contains(field), "missing error for {}", field);
                }
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_update_profile_payload_into_parts() {
        let payload = UpdateProfilePayload {
            user_id: Some("  ".to_string()),
            name: Some("New name".to_string()),
            image: None,
        };

        let (user_id, updates) = payload.into_parts();
        assert!(user_id.is_none());
        assert!(!updates.is_empty());
        assert_eq!(updates.name.as_deref(), Some("New name"));
        assert!(UpdateProfile::default().is_empty());
    }
}
