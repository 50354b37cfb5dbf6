//! Metering session handlers: start, list, get, stop.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    SessionDto, SessionListParams, SessionListResponse, StartSessionRequest, StartSessionResponse,
};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, StorefrontError};

/// `POST /sessions` — Start metered playback.
///
/// # Errors
///
/// Returns [`StorefrontError::MovieNotFound`] for an unknown movie or
/// [`StorefrontError::InsufficientFunds`] when the balance cannot cover a
/// single second.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "Start a playback session",
    description = "Validates the movie and balance, force-closes any session the user already has running, starts per-second metering, and reveals the playback URL.",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = StartSessionResponse),
        (status = 402, description = "Balance cannot cover one second", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse),
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, StorefrontError> {
    let movie = state
        .catalog
        .get_movie(req.movie_id)
        .await?
        .ok_or(StorefrontError::MovieNotFound(req.movie_id))?;

    let summary = state
        .metering
        .start_session(req.user_id, req.movie_id, state.rate_per_second)
        .await?;

    let response = StartSessionResponse {
        session: SessionDto::from(summary),
        playback_url: movie.playback_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /sessions` — List live sessions.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "List live sessions",
    params(SessionListParams),
    responses(
        (status = 200, description = "Live session snapshots", body = SessionListResponse),
    )
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionListParams>,
) -> impl IntoResponse {
    let summaries = state.metering.list_sessions(params.user_id).await;
    Json(SessionListResponse {
        data: summaries.into_iter().map(SessionDto::from).collect(),
    })
}

/// `GET /sessions/:id` — Get a session snapshot.
///
/// # Errors
///
/// Returns [`StorefrontError::SessionNotFound`] if the session does not
/// exist or has already been reaped.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    summary = "Get session state",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session snapshot", body = SessionDto),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, StorefrontError> {
    let summary = state.metering.get_session(SessionId::from_uuid(id)).await?;
    Ok(Json(SessionDto::from(summary)))
}

/// `DELETE /sessions/:id` — Stop a session (user closed the player).
///
/// # Errors
///
/// Returns [`StorefrontError::SessionNotFound`] if the session does not
/// exist, or [`StorefrontError::HistoryWriteFailed`] when the session
/// terminated but its history record could not be written.
#[utoipa::path(
    delete,
    path = "/api/v1/sessions/{id}",
    tag = "Sessions",
    summary = "Stop a playback session",
    description = "Idempotent: stopping an already ended session returns its final snapshot. In-flight debits complete first; nothing is charged afterwards.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Final session snapshot", body = SessionDto),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn stop_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, StorefrontError> {
    let summary = state
        .metering
        .stop_session(SessionId::from_uuid(id))
        .await?;
    Ok(Json(SessionDto::from(summary)))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session).delete(stop_session))
}
