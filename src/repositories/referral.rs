use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    models::{
        referral::{Referral, ReferralStatus},
        user::ReferralCode,
    },
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct ReferralRepository {
    pool: PgPool,
}
impl ReferralRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Inserts a claimed referral and returns its id. Takes an executor so the
    /// insert can join an open transaction.
    pub async fn insert<'e, E>(
        executor: E,
        referrer_id: &str,
        referred_id: &str,
        referral_code: &ReferralCode,
        referred_at: DateTime<Utc>,
    ) -> Result<i32, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created_id = sqlx::query_scalar::<_, i32>(
            "
        INSERT INTO referrals (referrer_id, referred_id, referral_code, status, referred_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
        )
        .bind(referrer_id)
        .bind(referred_id)
        .bind(referral_code)
        .bind(ReferralStatus::Claimed.to_string())
        .bind(referred_at)
        .fetch_one(executor)
        .await?;

        Ok(created_id)
    }

    pub async fn find_by_id(&self, id: i32) -> DbResult<Option<Referral>> {
        let referral = sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(referral)
    }

    pub async fn find_by_referred(&self, referred_id: &str) -> DbResult<Option<Referral>> {
        let referral = sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE referred_id = $1")
            .bind(referred_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(referral)
    }

    pub async fn find_all_by_referrer(&self, referrer_id: &str) -> DbResult<Vec<Referral>> {
        let referrals = sqlx::query_as::<_, Referral>(
            "SELECT * FROM referrals WHERE referrer_id = $1 ORDER BY referred_at DESC, id DESC",
        )
        .bind(referrer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(referrals)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM referrals")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
