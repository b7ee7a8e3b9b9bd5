use axum::{
    extract::{self, State},
    http::StatusCode,
    Json,
};

use crate::{
    handlers::{HandlerError, SuccessResponse},
    http_server::AppState,
    models::forum::{
        ForumPost, ForumPostInput, ForumPostWithReplies, ForumReply, ForumReplyInput, NewForumPost, NewForumReply,
        PostLikesPayload, PostLikesResponse,
    },
    AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum ForumHandlerError {
    #[error("{0}")]
    InvalidInput(String),
}

/// GET /forum-posts
pub async fn handle_get_forum_posts(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<ForumPostWithReplies>>>, AppError> {
    let threads = state.db.forum.find_all_with_replies().await?;

    Ok(SuccessResponse::new(threads))
}

/// POST /forum-posts (also served as POST /submit-post)
pub async fn handle_create_forum_post(
    State(state): State<AppState>,
    extract::Json(input): Json<ForumPostInput>,
) -> Result<(StatusCode, Json<SuccessResponse<ForumPost>>), AppError> {
    let new_post = NewForumPost::new(input)?;
    ensure_author_exists(&state, &new_post.user_email.0).await?;

    let post = state.db.forum.create_post(&new_post).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(post)))
}

/// POST /forum-replies
pub async fn handle_create_forum_reply(
    State(state): State<AppState>,
    extract::Json(input): Json<ForumReplyInput>,
) -> Result<(StatusCode, Json<SuccessResponse<ForumReply>>), AppError> {
    let new_reply = NewForumReply::new(input)?;
    ensure_author_exists(&state, &new_reply.user_email.0).await?;

    let reply = state.db.forum.create_reply(&new_reply).await?;

    Ok((StatusCode::CREATED, SuccessResponse::new(reply)))
}

/// PUT /forum-posts/likes
pub async fn handle_update_post_likes(
    State(state): State<AppState>,
    extract::Json(payload): Json<PostLikesPayload>,
) -> Result<Json<SuccessResponse<PostLikesResponse>>, AppError> {
    let like_count = state.db.forum.update_post_likes(payload.post_id, payload.clicked).await?;

    Ok(SuccessResponse::new(PostLikesResponse {
        post_id: payload.post_id,
        like_count,
    }))
}

async fn ensure_author_exists(state: &AppState, email: &str) -> Result<(), AppError> {
    if state.db.users.find_by_email(email).await?.is_none() {
        return Err(AppError::Handler(HandlerError::Forum(ForumHandlerError::InvalidInput(
            format!("No user with email {}", email),
        ))));
    }

    Ok(())
}
