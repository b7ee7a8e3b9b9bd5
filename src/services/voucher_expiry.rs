use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::{
    db_persistence::{DbError, DbPersistence},
    metrics::track_vouchers_expired,
};

#[derive(Debug, thiserror::Error)]
pub enum VoucherExpiryError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type VoucherExpiryResult<T> = Result<T, VoucherExpiryError>;

/// Periodically flips issued vouchers past their expiry to `expired`.
pub struct VoucherExpiryService {
    db: Arc<DbPersistence>,
    check_interval: Duration,
}

impl VoucherExpiryService {
    pub fn new(db: Arc<DbPersistence>, check_interval: Duration) -> Self {
        Self { db, check_interval }
    }

    pub async fn start(&self) -> VoucherExpiryResult<()> {
        tracing::info!(
            "Starting voucher expiry service with {} second check interval",
            self.check_interval.as_secs()
        );

        let mut interval_timer = interval(self.check_interval);

        loop {
            interval_timer.tick().await;

            if let Err(e) = self.expire_due_vouchers().await {
                tracing::error!("Error in voucher expiry service: {}", e);
                return Err(e);
            }
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<VoucherExpiryResult<()>> {
        tokio::spawn(async move { self.start().await })
    }

    pub async fn expire_due_vouchers(&self) -> VoucherExpiryResult<u64> {
        let expired = self.db.vouchers.expire_due(Utc::now()).await?;

        if expired == 0 {
            tracing::debug!("No vouchers due for expiry");
        } else {
            tracing::info!("Expired {} vouchers", expired);
            track_vouchers_expired(expired);
        }

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            user::ReferralCode,
            voucher::{NewVoucher, VoucherStatus},
        },
        repositories::{referral::ReferralRepository, voucher::VoucherRepository},
        utils::test_db::{create_persisted_user, setup_test_pool},
    };

    #[tokio::test]
    async fn test_expire_due_vouchers() {
        let pool = setup_test_pool().await;
        let db = Arc::new(DbPersistence::from_pool(pool.clone()));
        create_persisted_user(&db.users, "referrer", Some("SWEEP1")).await;
        create_persisted_user(&db.users, "referred", None).await;

        let ref_id = ReferralRepository::insert(
            &pool,
            "referrer",
            "referred",
            &ReferralCode("SWEEP1".to_string()),
            Utc::now(),
        )
        .await
        .unwrap();

        let now = Utc::now();
        let stale = VoucherRepository::insert(
            &pool,
            &NewVoucher {
                user_id: "referred".to_string(),
                ref_id,
                amount: 5,
                issued_at: now - chrono::Duration::days(45),
                expires_at: now - chrono::Duration::days(14),
            },
        )
        .await
        .unwrap();
        let live = VoucherRepository::insert(
            &pool,
            &NewVoucher {
                user_id: "referrer".to_string(),
                ref_id,
                amount: 5,
                issued_at: now,
                expires_at: now + chrono::Duration::days(30),
            },
        )
        .await
        .unwrap();

        let service = VoucherExpiryService::new(db.clone(), Duration::from_secs(1));
        assert_eq!(service.expire_due_vouchers().await.unwrap(), 1);
        assert_eq!(service.expire_due_vouchers().await.unwrap(), 0);

        assert_eq!(
            db.vouchers.find_by_id(stale).await.unwrap().unwrap().status,
            VoucherStatus::Expired
        );
        assert_eq!(
            db.vouchers.find_by_id(live).await.unwrap().unwrap().status,
            VoucherStatus::Issued
        );
    }
}
