use crate::db_persistence::DbError;

pub type DbResult<T> = Result<T, DbError>;

pub mod announcement;
pub mod forum;
pub mod referral;
pub mod review;
pub mod user;
pub mod voucher;

/// Row offset of a 1-based page. `None` when the offset doesn't fit in a `u32`.
pub fn calculate_page_offset(page: u32, page_size: u32) -> Option<u32> {
    (page.max(1) - 1).checked_mul(page_size)
}
