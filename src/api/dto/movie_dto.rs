//! Catalog DTOs.
//!
//! Catalog responses never carry the playback URL; it is revealed only
//! through a successfully started session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common_dto::PaginationMeta;
use crate::persistence::models::Movie;

/// A catalog entry as exposed to browsing clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieDto {
    /// Movie identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional synopsis.
    pub description: Option<String>,
    /// Optional poster image URL.
    pub thumbnail_url: Option<String>,
    /// Catalog entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Movie> for MovieDto {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            description: movie.description,
            thumbnail_url: movie.thumbnail_url,
            created_at: movie.created_at,
        }
    }
}

/// Paginated list response for `GET /movies`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieListResponse {
    /// Catalog entries, newest first.
    pub data: Vec<MovieDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
