use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    db_persistence::DbError,
    models::forum::{ForumPost, ForumPostWithReplies, ForumReply, NewForumPost, NewForumReply},
    repositories::DbResult,
};

#[derive(Clone, Debug)]
pub struct ForumRepository {
    pool: PgPool,
}
impl ForumRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn create_post(&self, new_post: &NewForumPost) -> DbResult<ForumPost> {
        let post = sqlx::query_as::<_, ForumPost>(
            "
        INSERT INTO forum_posts (user_email, business_uen, title, body)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
        )
        .bind(&new_post.user_email)
        .bind(&new_post.business_uen)
        .bind(&new_post.title)
        .bind(&new_post.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn create_reply(&self, new_reply: &NewForumReply) -> DbResult<ForumReply> {
        if self.find_post(new_reply.post_id).await?.is_none() {
            return Err(DbError::PostNotFound(new_reply.post_id));
        }

        let reply = sqlx::query_as::<_, ForumReply>(
            "
        INSERT INTO forum_posts_replies (post_id, user_email, body)
        VALUES ($1, $2, $3)
        RETURNING *
        ",
        )
        .bind(new_reply.post_id)
        .bind(&new_reply.user_email)
        .bind(&new_reply.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(reply)
    }

    pub async fn find_post(&self, id: i32) -> DbResult<Option<ForumPost>> {
        let post = sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// All posts, newest first, each with its replies in posting order.
    pub async fn find_all_with_replies(&self) -> DbResult<Vec<ForumPostWithReplies>> {
        let posts = sqlx::query_as::<_, ForumPost>("SELECT * FROM forum_posts ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        let replies = sqlx::query_as::<_, ForumReply>(
            "SELECT * FROM forum_posts_replies ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut replies_by_post: HashMap<i32, Vec<ForumReply>> = HashMap::new();
        for reply in replies {
            replies_by_post.entry(reply.post_id).or_default().push(reply);
        }

        let threads = posts
            .into_iter()
            .map(|post| {
                let replies = replies_by_post.remove(&post.id).unwrap_or_default();
                ForumPostWithReplies { post, replies }
            })
            .collect();

        Ok(threads)
    }

    /// Adds or removes one like and returns the new count. Never drops below zero.
    pub async fn update_post_likes(&self, post_id: i32, clicked: bool) -> DbResult<i32> {
        let delta: i32 = if clicked { 1 } else { -1 };

        let like_count = sqlx::query_scalar::<_, i32>(
            r#"
        UPDATE forum_posts
        SET like_count = GREATEST(like_count + $1, 0)
        WHERE id = $2
        RETURNING like_count
        "#,
        )
        .bind(delta)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        like_count.ok_or(DbError::PostNotFound(post_id))
    }
}
