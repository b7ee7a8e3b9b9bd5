use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::repositories::{
    announcement::AnnouncementRepository, forum::ForumRepository, referral::ReferralRepository,
    review::ReviewRepository, user::UserRepository, voucher::VoucherRepository, DbResult,
};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Forum post not found: {0}")]
    PostNotFound(i32),
    #[error("Announcement not found: {0}")]
    AnnouncementNotFound(i32),
}

#[derive(Debug, Clone)]
pub struct DbPersistence {
    pub users: UserRepository,
    pub referrals: ReferralRepository,
    pub vouchers: VoucherRepository,
    pub forum: ForumRepository,
    pub reviews: ReviewRepository,
    pub announcements: AnnouncementRepository,

    pub pool: PgPool,
}

impl DbPersistence {
    pub async fn new(database_url: &str) -> DbResult<Self> {
        Self::with_max_connections(database_url, 10).await
    }

    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(&pool),
            referrals: ReferralRepository::new(&pool),
            vouchers: VoucherRepository::new(&pool),
            forum: ForumRepository::new(&pool),
            reviews: ReviewRepository::new(&pool),
            announcements: AnnouncementRepository::new(&pool),
            pool,
        }
    }

    pub async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;

        Ok(())
    }
}
