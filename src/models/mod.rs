#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid referral code length: {0}")]
    InvalidReferralCodeLength(usize),
}

pub type ModelResult<T> = Result<T, ModelError>;

pub mod announcement;
pub mod forum;
pub mod referral;
pub mod review;
pub mod user;
pub mod voucher;
