use sqlx::PgPool;

use crate::{
    models::review::{BusinessReview, NewReview},
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct ReviewRepository {
    pool: PgPool,
}
impl ReviewRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create(&self, new_review: &NewReview) -> DbResult<BusinessReview> {
        let review = sqlx::query_as::<_, BusinessReview>(
            "
        INSERT INTO business_reviews (user_email, business_uen, rating, body)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
        )
        .bind(&new_review.user_email)
        .bind(&new_review.business_uen)
        .bind(new_review.rating)
        .bind(&new_review.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn find_all_by_business(&self, business_uen: &str) -> DbResult<Vec<BusinessReview>> {
        let reviews = sqlx::query_as::<_, BusinessReview>(
            "SELECT * FROM business_reviews WHERE business_uen = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(business_uen)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
