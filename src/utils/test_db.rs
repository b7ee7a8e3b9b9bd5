use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::Config,
    models::user::{NewUser, NewUserInput, User},
    repositories::user::UserRepository,
};

// Every DB-backed test truncates the same tables, so run them with --test-threads=1.
pub async fn setup_test_pool() -> PgPool {
    let config = Config::load_test_env().expect("Failed to load configuration for tests");
    let pool = PgPoolOptions::new()
        .max_connections(config.data.max_connections)
        .connect(config.get_database_url())
        .await
        .expect("Failed to create pool.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations for tests");

    reset_database(&pool).await;

    pool
}

/// Name of the CHECK constraint tests add to `vouchers` to force an insert to fail.
pub const FAILING_VOUCHER_CHECK: &str = "test_failing_voucher_check";

pub async fn reset_database(pool: &PgPool) {
    drop_failing_voucher_check(pool).await;

    sqlx::query(
        "TRUNCATE vouchers, referrals, forum_posts_replies, forum_posts, business_reviews, business_announcements, users RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await
    .expect("Failed to truncate tables for tests");
}

/// Makes every voucher insert for `user_id` fail until the constraint is dropped.
/// `reset_database` drops it too, so a test that dies midway can't leak it.
pub async fn add_failing_voucher_check(pool: &PgPool, user_id: &str) {
    drop_failing_voucher_check(pool).await;

    // DDL can't take bind parameters.
    let user_id = user_id.replace('\'', "''");
    sqlx::query(&format!(
        "ALTER TABLE vouchers ADD CONSTRAINT {} CHECK (user_id <> '{}')",
        FAILING_VOUCHER_CHECK, user_id
    ))
    .execute(pool)
    .await
    .expect("Failed to add voucher check constraint");
}

pub async fn drop_failing_voucher_check(pool: &PgPool) {
    sqlx::query(&format!(
        "ALTER TABLE vouchers DROP CONSTRAINT IF EXISTS {}",
        FAILING_VOUCHER_CHECK
    ))
    .execute(pool)
    .await
    .expect("Failed to drop voucher check constraint");
}

pub async fn voucher_constraint_exists(pool: &PgPool, name: &str) -> bool {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM pg_constraint WHERE conrelid = 'vouchers'::regclass AND conname = $1)",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .expect("Failed to query pg_constraint")
}

pub async fn create_persisted_user(repo: &UserRepository, id: &str, referral_code: Option<&str>) -> User {
    let input = NewUserInput {
        id: id.to_string(),
        name: format!("Test User {}", id),
        email: format!("{}@example.com", id),
        referral_code: referral_code.map(str::to_string),
    };
    let new_user = NewUser::new(input).unwrap();
    repo.create(&new_user).await.unwrap()
}
