use axum::{
    extract::{self, State},
    Json,
};

use crate::{
    handlers::{HandlerError, SuccessResponse},
    http_server::AppState,
    models::referral::{RedeemReferral, RedeemReferralInput, RedeemReferralResponse},
    services::referral_redeemer::RedemptionOutcome,
    AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum ReferralHandlerError {
    #[error("Referral not applicable")]
    NotApplicable,
}

/// POST /referrals/redeem
pub async fn handle_redeem_referral(
    State(state): State<AppState>,
    extract::Json(input): Json<RedeemReferralInput>,
) -> Result<Json<SuccessResponse<RedeemReferralResponse>>, AppError> {
    let request = RedeemReferral::new(input)?;

    let outcome = state
        .redeemer
        .try_redeem(&request.referral_code, &request.referred_id)
        .await?;

    match outcome {
        RedemptionOutcome::Committed { referral_id } => Ok(SuccessResponse::new(RedeemReferralResponse {
            redeemed: true,
            referral_id,
        })),
        RedemptionOutcome::Rejected(_) => Err(AppError::Handler(HandlerError::Referral(
            ReferralHandlerError::NotApplicable,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        http_server::AppState,
        models::voucher::VoucherStatus,
        routes::referral::referral_routes,
        utils::{
            test_app_state::create_test_app_state,
            test_db::{create_persisted_user, reset_database},
        },
    };

    async fn setup() -> (AppState, Router) {
        let state = create_test_app_state().await;
        reset_database(&state.db.pool).await;
        let router = referral_routes().with_state(state.clone());

        (state, router)
    }

    fn redeem_request(payload: Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/referrals/redeem")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_redeem_referral_success() {
        let (state, router) = setup().await;
        create_persisted_user(&state.db.users, "user-7", Some("ABC123")).await;
        create_persisted_user(&state.db.users, "user-42", None).await;

        let response = router
            .oneshot(redeem_request(json!({ "referral_code": "ABC123", "referred_id": "user-42" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["redeemed"], true);
        let referral_id = body["data"]["referral_id"].as_i64().unwrap() as i32;

        let vouchers = state.db.vouchers.find_all_by_referral(referral_id).await.unwrap();
        assert_eq!(vouchers.len(), 2);
        assert!(vouchers.iter().all(|v| v.amount == 5 && v.status == VoucherStatus::Issued));

        let referred = state.db.users.find_by_id("user-42").await.unwrap().unwrap();
        assert_eq!(referred.referred_by_user_id.as_deref(), Some("user-7"));
    }

    #[tokio::test]
    async fn test_redeem_referral_not_applicable() {
        let (state, router) = setup().await;
        create_persisted_user(&state.db.users, "user-7", Some("ABC123")).await;
        create_persisted_user(&state.db.users, "user-42", None).await;

        for payload in [
            json!({ "referral_code": "NOPE99", "referred_id": "user-42" }),
            json!({ "referral_code": "ABC123", "referred_id": "user-7" }),
            json!({ "referral_code": " ABC123 ", "referred_id": "user-42" }),
            json!({ "referral_code": "abc123", "referred_id": "user-42" }),
            json!({ "referral_code": "not a code!", "referred_id": "user-42" }),
            json!({ "referral_code": "", "referred_id": "user-42" }),
        ] {
            let response = router.clone().oneshot(redeem_request(payload)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

            let body = body_json(response).await;
            assert_eq!(body["status"], "fail");
            assert_eq!(body["message"], "Referral not applicable");
        }

        assert_eq!(state.db.referrals.count().await.unwrap(), 0);
        assert_eq!(state.db.vouchers.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_redeem_referral_twice() {
        let (state, router) = setup().await;
        create_persisted_user(&state.db.users, "user-7", Some("ABC123")).await;
        create_persisted_user(&state.db.users, "user-42", None).await;

        let payload = json!({ "referral_code": "ABC123", "referred_id": "user-42" });
        let first = router.clone().oneshot(redeem_request(payload.clone())).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router.oneshot(redeem_request(payload)).await.unwrap();
        assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.db.vouchers.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_redeem_referral_validation() {
        let (_state, router) = setup().await;

        let response = router
            .oneshot(redeem_request(json!({ "referral_code": "ABC123", "referred_id": "  " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
