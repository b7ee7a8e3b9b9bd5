use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    models::announcement::{BusinessAnnouncement, NewAnnouncement, UpdateAnnouncement},
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct AnnouncementRepository {
    pool: PgPool,
}
impl AnnouncementRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create(&self, new_announcement: &NewAnnouncement) -> DbResult<BusinessAnnouncement> {
        let announcement = sqlx::query_as::<_, BusinessAnnouncement>(
            "
        INSERT INTO business_announcements (business_uen, title, content, image_url)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
        )
        .bind(&new_announcement.business_uen)
        .bind(&new_announcement.title)
        .bind(&new_announcement.content)
        .bind(&new_announcement.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(announcement)
    }

    pub async fn find_by_id(&self, id: i32) -> DbResult<Option<BusinessAnnouncement>> {
        let announcement =
            sqlx::query_as::<_, BusinessAnnouncement>("SELECT * FROM business_announcements WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(announcement)
    }

    pub async fn find_all(&self) -> DbResult<Vec<BusinessAnnouncement>> {
        let announcements = sqlx::query_as::<_, BusinessAnnouncement>(
            "SELECT * FROM business_announcements ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    pub async fn find_all_by_business(&self, business_uen: &str) -> DbResult<Vec<BusinessAnnouncement>> {
        let announcements = sqlx::query_as::<_, BusinessAnnouncement>(
            "SELECT * FROM business_announcements WHERE business_uen = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(business_uen)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    /// Writes only the fields present in `updates`. An empty `image_url`
    /// clears the image. `None` when no announcement has that id.
    pub async fn update(&self, id: i32, updates: &UpdateAnnouncement) -> DbResult<Option<BusinessAnnouncement>> {
        if updates.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE business_announcements SET updated_at = NOW()");
        if let Some(title) = &updates.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(content) = &updates.content {
            qb.push(", content = ").push_bind(content.clone());
        }
        if let Some(image_url) = &updates.image_url {
            let image_url = Some(image_url.clone()).filter(|url| !url.trim().is_empty());
            qb.push(", image_url = ").push_bind(image_url);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        let announcement = qb
            .build_query_as::<BusinessAnnouncement>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(announcement)
    }

    pub async fn delete(&self, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM business_announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
