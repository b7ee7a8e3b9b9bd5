use axum::Json;
use serde::Serialize;

use crate::handlers::{
    announcement::AnnouncementHandlerError, forum::ForumHandlerError, referral::ReferralHandlerError,
    review::ReviewHandlerError, user::UserHandlerError, voucher::VoucherHandlerError,
};

pub mod announcement;
pub mod forum;
pub mod referral;
pub mod review;
pub mod user;
pub mod voucher;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    User(#[from] UserHandlerError),
    #[error(transparent)]
    Referral(#[from] ReferralHandlerError),
    #[error(transparent)]
    Voucher(#[from] VoucherHandlerError),
    #[error(transparent)]
    Forum(#[from] ForumHandlerError),
    #[error(transparent)]
    Review(#[from] ReviewHandlerError),
    #[error(transparent)]
    Announcement(#[from] AnnouncementHandlerError),

    #[error("{0}")]
    QueryParams(String),
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    data: T,
}
impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMetadata {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
}

pub fn calculate_total_pages(page_size: u32, total_items: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }

    total_items.div_ceil(page_size)
}
