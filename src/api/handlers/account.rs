//! Account handlers: registration, profile, watch history, top-up intake.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    ProfileDto, RegisterRequest, SubmitTopUpRequest, SubmitTopUpResponse, WatchHistoryResponse,
    WatchRecordDto,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, StorefrontError};

/// `POST /accounts` — Register a profile for an authenticated user.
///
/// # Errors
///
/// Returns [`StorefrontError::InvalidRequest`] for an empty name or a
/// duplicate profile.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    tag = "Accounts",
    summary = "Register a profile",
    description = "Creates the profile with a zero balance and records the client's public IP best-effort. Authentication itself is handled by the external identity provider.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileDto),
        (status = 400, description = "Invalid request or duplicate profile", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StorefrontError> {
    let profile = state
        .accounts
        .register(req.user_id, &req.full_name, req.phone.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ProfileDto::from(profile))))
}

/// `GET /accounts/:user_id` — Get a profile including its balance.
///
/// # Errors
///
/// Returns [`StorefrontError::ProfileNotFound`] if no profile exists.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}",
    tag = "Accounts",
    summary = "Get profile and balance",
    params(
        ("user_id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileDto),
        (status = 404, description = "Profile not found", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, StorefrontError> {
    let profile = state.accounts.profile(user_id).await?;
    Ok(Json(ProfileDto::from(profile)))
}

/// `GET /accounts/:user_id/history` — Get watch history, newest first.
///
/// # Errors
///
/// Returns [`StorefrontError::PersistenceError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{user_id}/history",
    tag = "Accounts",
    summary = "Get watch history",
    params(
        ("user_id" = uuid::Uuid, Path, description = "User UUID"),
    ),
    responses(
        (status = 200, description = "Watch history", body = WatchHistoryResponse),
    )
)]
pub async fn watch_history(
    State(state): State<AppState>,
    Path(user_id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, StorefrontError> {
    let records = state.accounts.watch_history(user_id).await?;
    Ok(Json(WatchHistoryResponse {
        data: records.into_iter().map(WatchRecordDto::from).collect(),
    }))
}

/// `POST /topups` — Submit a top-up request for manual review.
///
/// # Errors
///
/// Returns [`StorefrontError::InvalidRequest`] for a non-positive amount
/// or empty transfer method.
#[utoipa::path(
    post,
    path = "/api/v1/topups",
    tag = "Accounts",
    summary = "Submit a top-up request",
    description = "The request lands in a pending queue; an admin approves or rejects it. Balances change only on approval.",
    request_body = SubmitTopUpRequest,
    responses(
        (status = 201, description = "Request queued", body = SubmitTopUpResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn submit_topup(
    State(state): State<AppState>,
    Json(req): Json<SubmitTopUpRequest>,
) -> Result<impl IntoResponse, StorefrontError> {
    let request_id = state
        .accounts
        .submit_topup(req.user_id, req.amount, &req.transfer_method)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitTopUpResponse {
            request_id,
            status: "pending".to_string(),
        }),
    ))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(register))
        .route("/accounts/{user_id}", get(get_profile))
        .route("/accounts/{user_id}/history", get(watch_history))
        .route("/topups", post(submit_topup))
}
