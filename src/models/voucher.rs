use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::handlers::PaginationMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherStatus {
    #[serde(rename = "issued")]
    Issued,
    #[serde(rename = "redeemed")]
    Redeemed,
    #[serde(rename = "expired")]
    Expired,
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoucherStatus::Issued => write!(f, "issued"),
            VoucherStatus::Redeemed => write!(f, "redeemed"),
            VoucherStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for VoucherStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "issued" => Ok(VoucherStatus::Issued),
            "redeemed" => Ok(VoucherStatus::Redeemed),
            "expired" => Ok(VoucherStatus::Expired),
            _ => Err(format!("Invalid voucher status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: i32,
    pub user_id: String,
    pub ref_id: i32,
    pub amount: i32,
    pub status: VoucherStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for Voucher {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status_str: String = row.try_get("status")?;
        let status = status_str.parse::<VoucherStatus>().map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            )))
        })?;

        Ok(Voucher {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            ref_id: row.try_get("ref_id")?,
            amount: row.try_get("amount")?,
            status,
            issued_at: row.try_get("issued_at")?,
            expires_at: row.try_get("expires_at")?,
            redeemed_at: row.try_get("redeemed_at")?,
        })
    }
}

impl Voucher {
    pub fn is_spendable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == VoucherStatus::Issued && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub user_id: String,
    pub ref_id: i32,
    pub amount: i32,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub const MAX_VOUCHER_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct VoucherQueryParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    pub status: Option<String>,
}

fn default_page() -> u32 { 1 }
fn default_limit() -> u32 { MAX_VOUCHER_PAGE_SIZE }

#[derive(Debug, Serialize)]
pub struct PaginatedVouchersResponse {
    pub data: Vec<Voucher>,
    pub meta: PaginationMetadata,
}

#[derive(Debug, Deserialize)]
pub struct RedeemVoucherPayload {
    pub user_id: String,
}
