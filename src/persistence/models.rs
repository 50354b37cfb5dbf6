//! Database row models for the storefront tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A movie row from the `movies` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    /// Movie identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional synopsis.
    pub description: Option<String>,
    /// Optional poster image URL.
    pub thumbnail_url: Option<String>,
    /// Non-empty URL the player streams from.
    pub playback_url: String,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A user profile row from the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Row identifier.
    pub id: Uuid,
    /// Opaque user identifier from the external auth provider.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Balance in smallest currency units; never negative.
    pub balance: i64,
    /// Best-effort client IP captured at registration.
    pub ip_address: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A top-up request row from the `topup_requests` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TopUpRequest {
    /// Request identifier.
    pub id: Uuid,
    /// Requesting user.
    pub user_id: Uuid,
    /// Requested amount in smallest currency units.
    pub amount: i64,
    /// Bank / transfer method chosen by the user.
    pub transfer_method: String,
    /// `pending`, `approved`, or `rejected`.
    pub status: String,
    /// Optional note set by the resolving admin.
    pub admin_note: Option<String>,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A watch-history row from the `watch_history` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Watching user.
    pub user_id: Uuid,
    /// Movie that was played.
    pub movie_id: Uuid,
    /// Fully paid seconds of playback.
    pub watch_duration: i64,
    /// Confirmed cost for the session.
    pub cost_deducted: i64,
    /// Record timestamp.
    pub watched_at: DateTime<Utc>,
}
