use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    handlers::voucher::{handle_get_user_vouchers, handle_redeem_voucher},
    http_server::AppState,
};

pub fn voucher_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/vouchers", get(handle_get_user_vouchers))
        .route("/vouchers/:voucher_id/redeem", put(handle_redeem_voucher))
}
