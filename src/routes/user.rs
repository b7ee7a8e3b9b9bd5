use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    handlers::user::{
        handle_delete_profile, handle_get_profile, handle_get_referral_info, handle_get_user_referrals,
        handle_update_profile,
    },
    http_server::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", put(handle_update_profile))
        .route(
            "/users/profile/:user_id",
            get(handle_get_profile).delete(handle_delete_profile),
        )
        .route("/users/:user_id/referral", get(handle_get_referral_info))
        .route("/users/:user_id/referrals", get(handle_get_user_referrals))
}
