pub mod referral_redeemer;
pub mod voucher_expiry;
