//! Admin handlers: top-up review queue and resolution.
//!
//! Every admin endpoint requires the shared access code in the
//! `x-admin-code` header; the code itself is checked by the account
//! service.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ResolveTopUpRequest, TopUpDto, TopUpListParams, TopUpListResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, StorefrontError};

/// Header carrying the shared admin access code.
pub const ADMIN_CODE_HEADER: &str = "x-admin-code";

fn access_code(headers: &HeaderMap) -> Result<&str, StorefrontError> {
    headers
        .get(ADMIN_CODE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(StorefrontError::Unauthorized)
}

/// `GET /admin/topups` — List top-up requests by status.
///
/// # Errors
///
/// Returns [`StorefrontError::Unauthorized`] for a missing or wrong
/// access code, or [`StorefrontError::InvalidRequest`] for an unknown
/// status filter.
#[utoipa::path(
    get,
    path = "/api/v1/admin/topups",
    tag = "Admin",
    summary = "List top-up requests",
    params(TopUpListParams),
    responses(
        (status = 200, description = "Matching requests", body = TopUpListResponse),
        (status = 401, description = "Missing or wrong access code", body = ErrorResponse),
    )
)]
pub async fn list_topups(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TopUpListParams>,
) -> Result<impl IntoResponse, StorefrontError> {
    let code = access_code(&headers)?;
    let requests = state.accounts.list_topups(code, &params.status).await?;
    Ok(Json(TopUpListResponse {
        data: requests.into_iter().map(TopUpDto::from).collect(),
    }))
}

/// `POST /admin/topups/:id/approve` — Approve a pending top-up.
///
/// # Errors
///
/// Returns [`StorefrontError::Unauthorized`] for a bad access code,
/// [`StorefrontError::TopUpNotFound`] for an unknown ID, or
/// [`StorefrontError::TopUpAlreadyResolved`] if already resolved.
#[utoipa::path(
    post,
    path = "/api/v1/admin/topups/{id}/approve",
    tag = "Admin",
    summary = "Approve a top-up request",
    description = "Marks the request approved and credits the user's balance in one transaction.",
    params(
        ("id" = uuid::Uuid, Path, description = "Top-up request UUID"),
    ),
    request_body = ResolveTopUpRequest,
    responses(
        (status = 200, description = "Approved request", body = TopUpDto),
        (status = 401, description = "Missing or wrong access code", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request already resolved", body = ErrorResponse),
    )
)]
pub async fn approve_topup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ResolveTopUpRequest>,
) -> Result<impl IntoResponse, StorefrontError> {
    let code = access_code(&headers)?;
    let request = state
        .accounts
        .approve_topup(code, id, req.admin_note.as_deref())
        .await?;
    Ok(Json(TopUpDto::from(request)))
}

/// `POST /admin/topups/:id/reject` — Reject a pending top-up.
///
/// # Errors
///
/// Returns [`StorefrontError::Unauthorized`] for a bad access code,
/// [`StorefrontError::TopUpNotFound`] for an unknown ID, or
/// [`StorefrontError::TopUpAlreadyResolved`] if already resolved.
#[utoipa::path(
    post,
    path = "/api/v1/admin/topups/{id}/reject",
    tag = "Admin",
    summary = "Reject a top-up request",
    params(
        ("id" = uuid::Uuid, Path, description = "Top-up request UUID"),
    ),
    request_body = ResolveTopUpRequest,
    responses(
        (status = 200, description = "Rejected request", body = TopUpDto),
        (status = 401, description = "Missing or wrong access code", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request already resolved", body = ErrorResponse),
    )
)]
pub async fn reject_topup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ResolveTopUpRequest>,
) -> Result<impl IntoResponse, StorefrontError> {
    let code = access_code(&headers)?;
    let request = state
        .accounts
        .reject_topup(code, id, req.admin_note.as_deref())
        .await?;
    Ok(Json(TopUpDto::from(request)))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/topups", get(list_topups))
        .route("/admin/topups/{id}/approve", post(approve_topup))
        .route("/admin/topups/{id}/reject", post(reject_topup))
}
