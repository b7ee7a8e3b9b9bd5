use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    db_persistence::DbError,
    models::user::{NewUser, ReferralCode, UpdateProfile, User},
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}
impl UserRepository {
    fn create_select_base_query<'a>() -> QueryBuilder<'a, Postgres> {
        QueryBuilder::new("SELECT * FROM users")
    }

    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create(&self, new_user: &NewUser) -> DbResult<User> {
        let user = sqlx::query_as::<_, User>(
            "
        INSERT INTO users (id, name, email, referral_code)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
        )
        .bind(&new_user.id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.referral_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let mut qb = UserRepository::create_select_base_query();
        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let user = qb.build_query_as().fetch_optional(&self.pool).await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let mut qb = UserRepository::create_select_base_query();
        qb.push(" WHERE email = ");
        qb.push_bind(email.to_lowercase());

        let user = qb.build_query_as().fetch_optional(&self.pool).await?;

        Ok(user)
    }

    pub async fn find_by_referral_code(&self, referral_code: &str) -> DbResult<Option<User>> {
        let mut qb = UserRepository::create_select_base_query();
        qb.push(" WHERE referral_code = ");
        qb.push_bind(referral_code);

        let user = qb.build_query_as().fetch_optional(&self.pool).await?;

        Ok(user)
    }

    /// Writes only the fields present in `updates` and returns the stored row.
    pub async fn update_profile(&self, id: &str, updates: &UpdateProfile) -> DbResult<User> {
        if updates.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DbError::UserNotFound(id.to_string()));
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
        if let Some(name) = &updates.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(image) = &updates.image {
            qb.push(", image = ").push_bind(image.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        let user = qb.build_query_as::<User>().fetch_optional(&self.pool).await?;

        user.ok_or_else(|| DbError::UserNotFound(id.to_string()))
    }

    /// Sets the referral code only if the user has none yet. Returns `None`
    /// when the user is missing or already has a code.
    pub async fn assign_referral_code(&self, id: &str, code: &ReferralCode) -> DbResult<Option<ReferralCode>> {
        let assigned = sqlx::query_scalar::<_, ReferralCode>(
            r#"
        UPDATE users
        SET referral_code = $1, updated_at = NOW()
        WHERE id = $2 AND referral_code IS NULL
        RETURNING referral_code
        "#,
        )
        .bind(code)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assigned)
    }

    /// Links a referred user to their referrer. The `IS NULL` guard makes the
    /// link write-once; callers must treat zero affected rows as "already referred".
    pub async fn link_referrer<'e, E>(executor: E, referred_id: &str, referrer_id: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
        UPDATE users
        SET referred_by_user_id = $1, updated_at = NOW()
        WHERE id = $2 AND referred_by_user_id IS NULL
        "#,
        )
        .bind(referrer_id)
        .bind(referred_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
