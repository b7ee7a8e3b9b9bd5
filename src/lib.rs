//! # Localoco
//!
//! Backend for a local-business discovery app. Users refer friends with a
//! referral code; a successful referral issues a voucher to both parties in
//! one database transaction. Also serves profiles, vouchers, a community
//! forum and business reviews over a JSON HTTP API.

pub mod args;
pub mod config;
pub mod db_persistence;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod metrics;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use db_persistence::DbPersistence;
pub use http_server::AppState;
pub use services::referral_redeemer::{RedemptionOutcome, RedemptionPolicy, ReferralRedeemer, RejectionReason};
pub use services::voucher_expiry::VoucherExpiryService;

// Re-export errors
pub use db_persistence::DbError;
pub use errors::{AppError, AppResult};
pub use http_server::HttpServerError;
pub use services::referral_redeemer::RedemptionError;
pub use services::voucher_expiry::VoucherExpiryError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}

/// Get the library name
pub fn name() -> &'static str {
    NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(name(), "localoco");
    }
}
