use rand::Rng;

use crate::models::{user::MAX_REFERRAL_CODE_LEN, ModelError, ModelResult};

pub const DEFAULT_REFERRAL_CODE_LEN: usize = 8;

// Omits 0/O and 1/I.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub fn generate_referral_code(len: usize) -> ModelResult<String> {
    if len == 0 || len > MAX_REFERRAL_CODE_LEN {
        return Err(ModelError::InvalidReferralCodeLength(len));
    }

    let mut rng = rand::rng();
    let code = (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();

    Ok(code)
}
