use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::{
    errors::{AppError, ValidationErrors},
    models::user::ReferralCode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferralStatus {
    #[serde(rename = "claimed")]
    Claimed,
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferralStatus::Claimed => write!(f, "claimed"),
        }
    }
}

impl std::str::FromStr for ReferralStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claimed" => Ok(ReferralStatus::Claimed),
            _ => Err(format!("Invalid referral status: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Referral {
    pub id: i32,
    pub referrer_id: String,
    pub referred_id: String,
    pub referral_code: ReferralCode,
    pub status: ReferralStatus,
    pub referred_at: DateTime<Utc>,
}
impl<'r> FromRow<'r, PgRow> for Referral {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_str: String = row.try_get("status")?;
        let status = status_str.parse::<ReferralStatus>().map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            )))
        })?;

        Ok(Referral {
            id: row.try_get("id")?,
            referrer_id: row.try_get("referrer_id")?,
            referred_id: row.try_get("referred_id")?,
            referral_code: row.try_get("referral_code")?,
            status,
            referred_at: row.try_get("referred_at")?,
        })
    }
}

/// Validated redemption request. The code is opaque: it is passed on
/// exactly as sent, and a code nobody owns is a rejection, not a 400.
#[derive(Debug, Clone)]
pub struct RedeemReferral {
    pub referral_code: String,
    pub referred_id: String,
}
impl RedeemReferral {
    pub fn new(input: RedeemReferralInput) -> Result<Self, AppError> {
        let mut errors = ValidationErrors::new();

        let referred_id = input.referred_id.trim().to_string();
        if referred_id.is_empty() {
            errors.add("referred_id", String::from("Referred user id shouldn't be empty."));
        }

        if errors.is_empty() {
            Ok(RedeemReferral {
                referral_code: input.referral_code,
                referred_id,
            })
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }
}

// And an unvalidated version that we can deserialize directly from JSON
#[derive(Debug, Deserialize)]
pub struct RedeemReferralInput {
    pub referral_code: String,
    pub referred_id: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemReferralResponse {
    pub redeemed: bool,
    pub referral_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_status_round_trips_through_text() {
        assert_eq!("CLAIMED".parse::<ReferralStatus>().unwrap(), ReferralStatus::Claimed);
        assert_eq!(ReferralStatus::Claimed.to_string(), "claimed");
        assert!("pending".parse::<ReferralStatus>().is_err());
    }

    #[test]
    fn test_redeem_referral_requires_referred_id() {
        let input = RedeemReferralInput {
            referral_code: "ABC123".to_string(),
            referred_id: "   ".to_string(),
        };
        assert!(matches!(RedeemReferral::new(input), Err(AppError::ValidationErrors(_))));
    }

    #[test]
    fn test_redeem_referral_keeps_code_verbatim() {
        let input = RedeemReferralInput {
            referral_code: " abc 123! ".to_string(),
            referred_id: " user-42 ".to_string(),
        };
        let redemption = RedeemReferral::new(input).unwrap();
        assert_eq!(redemption.referral_code, " abc 123! ");
        assert_eq!(redemption.referred_id, "user-42");

        let input = RedeemReferralInput {
            referral_code: "".to_string(),
            referred_id: "user-42".to_string(),
        };
        assert_eq!(RedeemReferral::new(input).unwrap().referral_code, "");
    }
}
