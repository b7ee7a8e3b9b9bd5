use axum::{routing::post, Router};

use crate::{handlers::referral::handle_redeem_referral, http_server::AppState};

pub fn referral_routes() -> Router<AppState> {
    Router::new().route("/referrals/redeem", post(handle_redeem_referral))
}
