use chrono::{DateTime, Months, SubsecRound, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    config::ReferralConfig,
    db_persistence::DbError,
    metrics::track_referral_redemption,
    models::{user::ReferralCode, voucher::NewVoucher},
    repositories::{referral::ReferralRepository, user::UserRepository, voucher::VoucherRepository},
};

#[derive(Debug, thiserror::Error)]
pub enum RedemptionError {
    #[error("Referral lookup failed: {0}")]
    Lookup(#[from] DbError),
    #[error("Referral transaction failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Voucher expiry out of range for issue time {0}")]
    ExpiryOutOfRange(DateTime<Utc>),
}

pub type RedemptionResult<T> = Result<T, RedemptionError>;

/// Why a redemption was refused. Rejections never change any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    UnknownCode,
    SelfReferral,
    UnknownReferredUser,
    AlreadyReferred,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::UnknownCode => "unknown_code",
            RejectionReason::SelfReferral => "self_referral",
            RejectionReason::UnknownReferredUser => "unknown_referred_user",
            RejectionReason::AlreadyReferred => "already_referred",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Committed { referral_id: i32 },
    Rejected(RejectionReason),
}

impl RedemptionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RedemptionOutcome::Committed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionPolicy {
    pub voucher_amount: i32,
    pub validity_months: u32,
}

impl Default for RedemptionPolicy {
    fn default() -> Self {
        Self {
            voucher_amount: 5,
            validity_months: 1,
        }
    }
}

impl From<&ReferralConfig> for RedemptionPolicy {
    fn from(config: &ReferralConfig) -> Self {
        Self {
            voucher_amount: config.voucher_amount,
            validity_months: config.voucher_validity_months,
        }
    }
}

/// Calendar-month expiry. Days past the end of the target month clamp to its
/// last day, so Jan 31 + 1 month is Feb 29 in a leap year.
pub fn voucher_expiry(issued_at: DateTime<Utc>, validity_months: u32) -> RedemptionResult<DateTime<Utc>> {
    issued_at
        .checked_add_months(Months::new(validity_months))
        .ok_or(RedemptionError::ExpiryOutOfRange(issued_at))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

/// Applies referral codes on behalf of referred users.
///
/// The three admission checks are plain reads. Everything that writes (the
/// referral row, one voucher per party and the referrer link on the referred
/// user) happens in a single transaction: it either commits as a whole or
/// rolls back as a whole.
#[derive(Clone, Debug)]
pub struct ReferralRedeemer {
    pool: PgPool,
    users: UserRepository,
    policy: RedemptionPolicy,
}

impl ReferralRedeemer {
    pub fn new(pool: &PgPool, policy: RedemptionPolicy) -> Self {
        Self {
            pool: pool.clone(),
            users: UserRepository::new(pool),
            policy,
        }
    }

    pub fn policy(&self) -> RedemptionPolicy {
        self.policy
    }

    /// `Ok(true)` when the referral was applied, `Ok(false)` when it was
    /// rejected, `Err` when the transaction failed and was rolled back.
    pub async fn redeem(&self, referral_code: &str, referred_user_id: &str) -> RedemptionResult<bool> {
        let outcome = self.try_redeem(referral_code, referred_user_id).await?;

        Ok(outcome.is_committed())
    }

    pub async fn try_redeem(&self, referral_code: &str, referred_user_id: &str) -> RedemptionResult<RedemptionOutcome> {
        let result = self.attempt(referral_code, referred_user_id).await;

        match &result {
            Ok(RedemptionOutcome::Committed { referral_id }) => {
                tracing::info!(
                    "Referral {} committed: code {} redeemed by {}",
                    referral_id,
                    referral_code,
                    referred_user_id
                );
                track_referral_redemption("committed");
            }
            Ok(RedemptionOutcome::Rejected(reason)) => {
                tracing::info!(
                    "Referral code {} rejected for {}: {}",
                    referral_code,
                    referred_user_id,
                    reason.as_str()
                );
                track_referral_redemption(reason.as_str());
            }
            Err(e) => {
                tracing::error!("Referral redemption failed for {}: {}", referred_user_id, e);
                track_referral_redemption("failed");
            }
        }

        result
    }

    async fn attempt(&self, referral_code: &str, referred_user_id: &str) -> RedemptionResult<RedemptionOutcome> {
        if referral_code.is_empty() {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::UnknownCode));
        }

        let Some(referrer) = self.users.find_by_referral_code(referral_code).await? else {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::UnknownCode));
        };

        if referrer.id == referred_user_id {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::SelfReferral));
        }

        let Some(referred) = self.users.find_by_id(referred_user_id).await? else {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::UnknownReferredUser));
        };

        if referred.referred_by_user_id.is_some() {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::AlreadyReferred));
        }

        // Stored timestamps keep microseconds; truncate so expiry math matches what is read back.
        let now = Utc::now().trunc_subsecs(6);
        let expires_at = voucher_expiry(now, self.policy.validity_months)?;

        let mut tx = self.pool.begin().await?;

        match self
            .apply(&mut tx, referral_code, &referrer.id, referred_user_id, now, expires_at)
            .await
        {
            Ok(outcome @ RedemptionOutcome::Committed { .. }) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Ok(outcome) => {
                tx.rollback().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!("Rollback after failed redemption also failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        referral_code: &str,
        referrer_id: &str,
        referred_user_id: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> RedemptionResult<RedemptionOutcome> {
        let code = ReferralCode(referral_code.to_string());

        let referral_id = match ReferralRepository::insert(&mut **tx, referrer_id, referred_user_id, &code, now).await {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Ok(RedemptionOutcome::Rejected(RejectionReason::AlreadyReferred));
            }
            Err(e) => return Err(e.into()),
        };

        // Referred user's voucher first, then the referrer's.
        for user_id in [referred_user_id, referrer_id] {
            let voucher = NewVoucher {
                user_id: user_id.to_string(),
                ref_id: referral_id,
                amount: self.policy.voucher_amount,
                issued_at: now,
                expires_at,
            };
            VoucherRepository::insert(&mut **tx, &voucher).await?;
        }

        let linked = UserRepository::link_referrer(&mut **tx, referred_user_id, referrer_id).await?;
        if linked == 0 {
            return Ok(RedemptionOutcome::Rejected(RejectionReason::AlreadyReferred));
        }

        Ok(RedemptionOutcome::Committed { referral_id })
    }
}
