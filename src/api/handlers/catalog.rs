//! Movie catalog handlers: list and get.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{MovieDto, MovieListResponse, PaginationMeta, PaginationParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, StorefrontError};

/// `GET /movies` — List the catalog with pagination.
///
/// # Errors
///
/// Returns [`StorefrontError::PersistenceError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    tag = "Catalog",
    summary = "List movies",
    description = "Returns a paginated catalog listing, newest first. Playback URLs are never included; they are revealed only by starting a session.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated catalog", body = MovieListResponse),
    )
)]
pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, StorefrontError> {
    let params = params.clamped();
    let (limit, offset) = params.limit_offset();

    let movies = state.catalog.list_movies(limit, offset).await?;
    let total = u32::try_from(state.catalog.count_movies().await?).unwrap_or(u32::MAX);
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.per_page)
    };

    Ok(Json(MovieListResponse {
        data: movies.into_iter().map(MovieDto::from).collect(),
        pagination: PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /movies/:id` — Get one catalog entry.
///
/// # Errors
///
/// Returns [`StorefrontError::MovieNotFound`] if the movie does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}",
    tag = "Catalog",
    summary = "Get movie details",
    params(
        ("id" = uuid::Uuid, Path, description = "Movie UUID"),
    ),
    responses(
        (status = 200, description = "Movie details", body = MovieDto),
        (status = 404, description = "Movie not found", body = ErrorResponse),
    )
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, StorefrontError> {
    let movie = state
        .catalog
        .get_movie(id)
        .await?
        .ok_or(StorefrontError::MovieNotFound(id))?;
    Ok(Json(MovieDto::from(movie)))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
}
