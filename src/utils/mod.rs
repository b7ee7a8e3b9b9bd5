pub mod generate_referral_code;

#[cfg(test)]
pub mod test_app_state;
#[cfg(test)]
pub mod test_db;
