use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    models::voucher::{NewVoucher, Voucher, VoucherStatus},
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct VoucherRepository {
    pool: PgPool,
}
impl VoucherRepository {
    fn push_user_filter_query<'a>(qb: &mut QueryBuilder<'a, Postgres>, user_id: &'a str, status: Option<VoucherStatus>) {
        qb.push(" FROM vouchers WHERE user_id = ").push_bind(user_id);

        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.to_string());
        }
    }

    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn insert<'e, E>(executor: E, new_voucher: &NewVoucher) -> Result<i32, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created_id = sqlx::query_scalar::<_, i32>(
            "
        INSERT INTO vouchers (user_id, ref_id, amount, status, issued_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
        )
        .bind(&new_voucher.user_id)
        .bind(new_voucher.ref_id)
        .bind(new_voucher.amount)
        .bind(VoucherStatus::Issued.to_string())
        .bind(new_voucher.issued_at)
        .bind(new_voucher.expires_at)
        .fetch_one(executor)
        .await?;

        Ok(created_id)
    }

    pub async fn find_by_id(&self, id: i32) -> DbResult<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(voucher)
    }

    pub async fn find_all_by_referral(&self, ref_id: i32) -> DbResult<Vec<Voucher>> {
        let vouchers = sqlx::query_as::<_, Voucher>("SELECT * FROM vouchers WHERE ref_id = $1 ORDER BY id")
            .bind(ref_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(vouchers)
    }

    pub async fn count_by_user(&self, user_id: &str, status: Option<VoucherStatus>) -> DbResult<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        VoucherRepository::push_user_filter_query(&mut qb, user_id, status);

        let total_items = qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(total_items)
    }

    pub async fn find_page_by_user(
        &self,
        user_id: &str,
        status: Option<VoucherStatus>,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Voucher>> {
        let mut qb = QueryBuilder::new("SELECT *");
        VoucherRepository::push_user_filter_query(&mut qb, user_id, status);
        qb.push(" ORDER BY issued_at DESC, id DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        let vouchers = qb.build_query_as::<Voucher>().fetch_all(&self.pool).await?;

        Ok(vouchers)
    }

    /// Spends a voucher. Returns `None` unless the voucher belongs to `user_id`,
    /// is still `issued` and has not expired at `now`.
    pub async fn redeem(&self, id: i32, user_id: &str, now: DateTime<Utc>) -> DbResult<Option<Voucher>> {
        let voucher = sqlx::query_as::<_, Voucher>(
            r#"
        UPDATE vouchers
        SET status = 'redeemed', redeemed_at = $3
        WHERE id = $1 AND user_id = $2 AND status = 'issued' AND expires_at > $3
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(voucher)
    }

    /// Moves every issued voucher whose expiry is at or before `now` to `expired`.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
        UPDATE vouchers
        SET status = 'expired'
        WHERE status = 'issued' AND expires_at <= $1
        "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vouchers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::user::ReferralCode,
        repositories::{referral::ReferralRepository, user::UserRepository},
        utils::test_db::{create_persisted_user, setup_test_pool},
    };
    use chrono::{Duration, TimeZone};

    struct Fixture {
        pool: PgPool,
        repo: VoucherRepository,
        ref_id: i32,
    }

    async fn setup() -> Fixture {
        let pool = setup_test_pool().await;
        let users = UserRepository::new(&pool);
        create_persisted_user(&users, "referrer", Some("VOUCH1")).await;
        create_persisted_user(&users, "referred", None).await;
        let ref_id = ReferralRepository::insert(
            &pool,
            "referrer",
            "referred",
            &ReferralCode("VOUCH1".to_string()),
            Utc::now(),
        )
        .await
        .unwrap();

        Fixture {
            repo: VoucherRepository::new(&pool),
            pool,
            ref_id,
        }
    }

    fn new_voucher(user_id: &str, ref_id: i32, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> NewVoucher {
        NewVoucher {
            user_id: user_id.to_string(),
            ref_id,
            amount: 5,
            issued_at,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let fx = setup().await;
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let expires_at = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();

        let id = VoucherRepository::insert(&fx.pool, &new_voucher("referred", fx.ref_id, issued_at, expires_at))
            .await
            .unwrap();

        let voucher = fx.repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(voucher.amount, 5);
        assert_eq!(voucher.status, VoucherStatus::Issued);
        assert_eq!(voucher.issued_at, issued_at);
        assert_eq!(voucher.expires_at, expires_at);
        assert!(voucher.redeemed_at.is_none());
    }

    #[tokio::test]
    async fn test_paging_and_status_filter() {
        let fx = setup().await;
        let now = Utc::now();
        for _ in 0..3 {
            VoucherRepository::insert(
                &fx.pool,
                &new_voucher("referred", fx.ref_id, now, now + Duration::days(30)),
            )
            .await
            .unwrap();
        }
        let spent = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referred", fx.ref_id, now, now + Duration::days(30)),
        )
        .await
        .unwrap();
        fx.repo.redeem(spent, "referred", now).await.unwrap().unwrap();

        assert_eq!(fx.repo.count_by_user("referred", None).await.unwrap(), 4);
        assert_eq!(
            fx.repo
                .count_by_user("referred", Some(VoucherStatus::Issued))
                .await
                .unwrap(),
            3
        );

        let first_page = fx.repo.find_page_by_user("referred", None, 3, 0).await.unwrap();
        assert_eq!(first_page.len(), 3);
        let second_page = fx.repo.find_page_by_user("referred", None, 3, 3).await.unwrap();
        assert_eq!(second_page.len(), 1);

        let redeemed = fx
            .repo
            .find_page_by_user("referred", Some(VoucherStatus::Redeemed), 10, 0)
            .await
            .unwrap();
        assert_eq!(redeemed.len(), 1);
        assert_eq!(redeemed[0].id, spent);
    }

    #[tokio::test]
    async fn test_redeem_is_single_use_and_owner_only() {
        let fx = setup().await;
        let now = Utc::now();
        let id = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referred", fx.ref_id, now, now + Duration::days(30)),
        )
        .await
        .unwrap();

        assert!(fx.repo.redeem(id, "referrer", now).await.unwrap().is_none());

        let redeemed = fx.repo.redeem(id, "referred", now).await.unwrap().unwrap();
        assert_eq!(redeemed.status, VoucherStatus::Redeemed);
        assert!(redeemed.redeemed_at.is_some());

        assert!(fx.repo.redeem(id, "referred", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_voucher_cannot_be_redeemed() {
        let fx = setup().await;
        let now = Utc::now();
        let id = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referred", fx.ref_id, now - Duration::days(40), now - Duration::days(10)),
        )
        .await
        .unwrap();

        assert!(fx.repo.redeem(id, "referred", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expire_due_only_touches_due_issued_vouchers() {
        let fx = setup().await;
        let now = Utc::now();
        let due = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referred", fx.ref_id, now - Duration::days(40), now - Duration::days(1)),
        )
        .await
        .unwrap();
        let fresh = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referrer", fx.ref_id, now, now + Duration::days(30)),
        )
        .await
        .unwrap();
        let spent = VoucherRepository::insert(
            &fx.pool,
            &new_voucher("referrer", fx.ref_id, now - Duration::days(40), now + Duration::days(1)),
        )
        .await
        .unwrap();
        fx.repo.redeem(spent, "referrer", now).await.unwrap().unwrap();

        let expired = fx.repo.expire_due(now + Duration::days(2)).await.unwrap();
        assert_eq!(expired, 1);

        assert_eq!(
            fx.repo.find_by_id(due).await.unwrap().unwrap().status,
            VoucherStatus::Expired
        );
        assert_eq!(
            fx.repo.find_by_id(fresh).await.unwrap().unwrap().status,
            VoucherStatus::Issued
        );
        assert_eq!(
            fx.repo.find_by_id(spent).await.unwrap().unwrap().status,
            VoucherStatus::Redeemed
        );

        assert_eq!(fx.repo.expire_due(now + Duration::days(2)).await.unwrap(), 0);
    }
}
