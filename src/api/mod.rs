//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "bioskop-gateway",
        description = "Pay-per-second movie streaming storefront API"
    ),
    paths(
        handlers::catalog::list_movies,
        handlers::catalog::get_movie,
        handlers::session::start_session,
        handlers::session::list_sessions,
        handlers::session::get_session,
        handlers::session::stop_session,
        handlers::account::register,
        handlers::account::get_profile,
        handlers::account::watch_history,
        handlers::account::submit_topup,
        handlers::admin::list_topups,
        handlers::admin::approve_topup,
        handlers::admin::reject_topup,
        handlers::system::health_handler,
        handlers::system::pricing_handler,
    ),
    components(schemas(
        dto::MovieDto,
        dto::MovieListResponse,
        dto::SessionDto,
        dto::SessionListResponse,
        dto::StartSessionRequest,
        dto::StartSessionResponse,
        dto::RegisterRequest,
        dto::ProfileDto,
        dto::WatchHistoryResponse,
        dto::SubmitTopUpRequest,
        dto::SubmitTopUpResponse,
        dto::TopUpDto,
        dto::TopUpListResponse,
        dto::ResolveTopUpRequest,
        dto::WatchRecordDto,
        dto::PaginationMeta,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Catalog", description = "Movie catalog browsing"),
        (name = "Sessions", description = "Metered playback sessions"),
        (name = "Accounts", description = "Profiles, balances, and top-ups"),
        (name = "Admin", description = "Top-up review queue"),
        (name = "System", description = "Health and pricing"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
