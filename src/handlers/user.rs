use axum::{
    extract::{self, Path, State},
    response::NoContent,
    Json,
};

use crate::{
    db_persistence::DbError,
    handlers::{HandlerError, SuccessResponse},
    http_server::AppState,
    models::{
        referral::Referral,
        user::{ReferralCode, ReferralInfoResponse, UpdateProfilePayload, User, UserProfileResponse},
    },
    utils::generate_referral_code::{generate_referral_code, DEFAULT_REFERRAL_CODE_LEN},
    AppError,
};

const REFERRAL_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum UserHandlerError {
    #[error("User id is required")]
    MissingUserId,
    #[error("No profile fields to update")]
    NoFieldsToUpdate,
}

async fn find_user(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state
        .db
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Database(DbError::UserNotFound(user_id.to_string())))
}

fn is_unique_violation(err: &DbError) -> bool {
    match err {
        DbError::Database(e) => e
            .as_database_error()
            .map(|db_err| db_err.is_unique_violation())
            .unwrap_or(false),
        _ => false,
    }
}

/// Returns the user's referral code, generating one the first time it is asked for.
pub async fn ensure_referral_code(state: &AppState, user: &User) -> Result<ReferralCode, AppError> {
    if let Some(code) = &user.referral_code {
        return Ok(code.clone());
    }

    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let candidate = ReferralCode(generate_referral_code(DEFAULT_REFERRAL_CODE_LEN)?);

        match state.db.users.assign_referral_code(&user.id, &candidate).await {
            Ok(Some(code)) => {
                tracing::info!("Generated referral code for user {}", user.id);
                return Ok(code);
            }
            // Someone else assigned a code first, or the user is gone.
            Ok(None) => {
                let current = find_user(state, &user.id).await?;
                if let Some(code) = current.referral_code {
                    return Ok(code);
                }
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("Referral code collision for user {}, retrying", user.id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Server(format!(
        "Could not generate a unique referral code for user {}",
        user.id
    )))
}

pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse<UserProfileResponse>>, AppError> {
    let user = find_user(&state, &user_id).await?;

    Ok(SuccessResponse::new(user.into()))
}

pub async fn handle_update_profile(
    State(state): State<AppState>,
    extract::Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<SuccessResponse<UserProfileResponse>>, AppError> {
    let (user_id, updates) = payload.into_parts();
    let Some(user_id) = user_id else {
        return Err(AppError::Handler(HandlerError::User(UserHandlerError::MissingUserId)));
    };
    if updates.is_empty() {
        return Err(AppError::Handler(HandlerError::User(UserHandlerError::NoFieldsToUpdate)));
    }

    let user = state.db.users.update_profile(&user_id, &updates).await?;

    Ok(SuccessResponse::new(user.into()))
}

pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<NoContent, AppError> {
    if !state.db.users.delete(&user_id).await? {
        return Err(AppError::Database(DbError::UserNotFound(user_id)));
    }

    tracing::info!("Deleted user {}", user_id);

    Ok(NoContent)
}

pub async fn handle_get_referral_info(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse<ReferralInfoResponse>>, AppError> {
    let user = find_user(&state, &user_id).await?;
    let code = ensure_referral_code(&state, &user).await?;

    Ok(SuccessResponse::new(ReferralInfoResponse {
        referral_code: code.0,
        user_id: user.id,
        name: user.name,
        email: user.email.0,
    }))
}

pub async fn handle_get_user_referrals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse<Vec<Referral>>>, AppError> {
    find_user(&state, &user_id).await?;
    let referrals = state.db.referrals.find_all_by_referrer(&user_id).await?;

    Ok(SuccessResponse::new(referrals))
}
