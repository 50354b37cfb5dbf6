//! Metering session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::SessionSummary;

/// Request body for `POST /sessions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// User whose balance will be metered.
    pub user_id: Uuid,
    /// Movie to play.
    pub movie_id: Uuid,
}

/// Point-in-time view of a metering session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDto {
    /// Session identifier.
    pub session_id: Uuid,
    /// Owner of the metered balance.
    pub user_id: Uuid,
    /// Movie being played.
    pub movie_id: Uuid,
    /// Cost per second in smallest currency units.
    pub rate: i64,
    /// Lifecycle state: `active`, `exhausted`, `user_closed`, or `error`.
    pub state: String,
    /// Fully paid seconds of playback.
    pub elapsed_secs: u64,
    /// Sum of confirmed debits.
    pub cost_deducted: i64,
    /// Whether the final watch-history record was written.
    pub history_recorded: bool,
    /// Session start timestamp.
    pub started_at: DateTime<Utc>,
    /// Timestamp of the last paid tick.
    pub last_tick_at: DateTime<Utc>,
}

impl From<SessionSummary> for SessionDto {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id.into(),
            user_id: summary.user_id,
            movie_id: summary.movie_id,
            rate: summary.rate,
            state: summary.state.as_str().to_string(),
            elapsed_secs: summary.elapsed_secs,
            cost_deducted: summary.cost_deducted,
            history_recorded: summary.history_recorded,
            started_at: summary.started_at,
            last_tick_at: summary.last_tick_at,
        }
    }
}

/// Response body for `POST /sessions` (201 Created). The playback URL is
/// only ever exposed here, once metering has begun.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartSessionResponse {
    /// The freshly started session.
    pub session: SessionDto,
    /// URL the player streams from.
    pub playback_url: String,
}

/// List response for `GET /sessions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionListResponse {
    /// Live session snapshots.
    pub data: Vec<SessionDto>,
}

/// Query parameters for `GET /sessions`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SessionListParams {
    /// Restrict the listing to one user's sessions.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}
