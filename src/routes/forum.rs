use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers::forum::{
        handle_create_forum_post, handle_create_forum_reply, handle_get_forum_posts, handle_update_post_likes,
    },
    http_server::AppState,
};

pub fn forum_routes() -> Router<AppState> {
    Router::new()
        .route("/forum-posts", get(handle_get_forum_posts).post(handle_create_forum_post))
        .route("/forum-posts/likes", put(handle_update_post_likes))
        .route("/forum-replies", post(handle_create_forum_reply))
        .route("/submit-post", post(handle_create_forum_post))
}
