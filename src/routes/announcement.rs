use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    handlers::announcement::{
        handle_create_announcement, handle_delete_announcement, handle_get_announcements,
        handle_update_announcement,
    },
    http_server::AppState,
};

pub fn announcement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/announcements",
            get(handle_get_announcements).post(handle_create_announcement),
        )
        .route(
            "/announcements/:announcement_id",
            put(handle_update_announcement).delete(handle_delete_announcement),
        )
}
