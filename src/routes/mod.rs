use axum::Router;

use crate::{
    http_server::AppState,
    routes::{
        announcement::announcement_routes, forum::forum_routes, referral::referral_routes, review::review_routes,
        user::user_routes, voucher::voucher_routes,
    },
};

pub mod announcement;
pub mod forum;
pub mod referral;
pub mod review;
pub mod user;
pub mod voucher;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(referral_routes())
        .merge(voucher_routes())
        .merge(forum_routes())
        .merge(review_routes())
        .merge(announcement_routes())
}
