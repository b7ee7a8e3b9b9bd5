use axum::{
    extract::{self, Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    db_persistence::DbError,
    handlers::{calculate_total_pages, HandlerError, PaginationMetadata, SuccessResponse},
    http_server::AppState,
    models::voucher::{
        PaginatedVouchersResponse, RedeemVoucherPayload, Voucher, VoucherQueryParams, VoucherStatus,
        MAX_VOUCHER_PAGE_SIZE,
    },
    repositories::calculate_page_offset,
    AppError,
};

#[derive(Debug, thiserror::Error)]
pub enum VoucherHandlerError {
    #[error("Voucher {0} cannot be redeemed")]
    NotRedeemable(i32),
}

/// GET /users/:user_id/vouchers
pub async fn handle_get_user_vouchers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<VoucherQueryParams>,
) -> Result<Json<PaginatedVouchersResponse>, AppError> {
    if params.page < 1 || params.limit < 1 {
        return Err(AppError::Handler(HandlerError::QueryParams(String::from(
            "page and limit must be at least 1",
        ))));
    }
    if params.limit > MAX_VOUCHER_PAGE_SIZE {
        return Err(AppError::Handler(HandlerError::QueryParams(format!(
            "limit must be at most {}",
            MAX_VOUCHER_PAGE_SIZE
        ))));
    }
    let offset = calculate_page_offset(params.page, params.limit)
        .ok_or_else(|| AppError::Handler(HandlerError::QueryParams(String::from("page is out of range"))))?;

    let status = params
        .status
        .as_deref()
        .map(|s| s.parse::<VoucherStatus>())
        .transpose()
        .map_err(|e| AppError::Handler(HandlerError::QueryParams(e)))?;

    if state.db.users.find_by_id(&user_id).await?.is_none() {
        return Err(AppError::Database(DbError::UserNotFound(user_id)));
    }

    let total_items = state.db.vouchers.count_by_user(&user_id, status).await? as u32;
    let total_pages = calculate_total_pages(params.limit, total_items);

    let vouchers = state
        .db
        .vouchers
        .find_page_by_user(&user_id, status, params.limit, offset)
        .await?;

    Ok(Json(PaginatedVouchersResponse {
        data: vouchers,
        meta: PaginationMetadata {
            page: params.page,
            page_size: params.limit,
            total_items,
            total_pages,
        },
    }))
}

/// PUT /vouchers/:voucher_id/redeem
pub async fn handle_redeem_voucher(
    State(state): State<AppState>,
    Path(voucher_id): Path<i32>,
    extract::Json(payload): Json<RedeemVoucherPayload>,
) -> Result<Json<SuccessResponse<Voucher>>, AppError> {
    let now = Utc::now();
    let Some(voucher) = state.db.vouchers.redeem(voucher_id, &payload.user_id, now).await? else {
        if let Some(existing) = state.db.vouchers.find_by_id(voucher_id).await? {
            tracing::info!(
                "Voucher {} not redeemed for {}: owner {}, status {}, spendable {}",
                voucher_id,
                payload.user_id,
                existing.user_id,
                existing.status,
                existing.is_spendable_at(now)
            );
        }
        return Err(AppError::Handler(HandlerError::Voucher(
            VoucherHandlerError::NotRedeemable(voucher_id),
        )));
    };

    tracing::info!("Voucher {} redeemed by {}", voucher.id, voucher.user_id);

    Ok(SuccessResponse::new(voucher))
}
