//! Account, watch-history, and top-up DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::persistence::models::{Profile, TopUpRequest, WatchRecord};

/// Request body for `POST /accounts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Identifier from the external auth provider.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Profile view returned by account endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileDto {
    /// Identifier from the external auth provider.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Balance in smallest currency units.
    pub balance: i64,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            full_name: profile.full_name,
            phone: profile.phone,
            balance: profile.balance,
            created_at: profile.created_at,
        }
    }
}

/// One watch-history entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WatchRecordDto {
    /// Record identifier.
    pub id: Uuid,
    /// Movie that was played.
    pub movie_id: Uuid,
    /// Fully paid seconds of playback.
    pub watch_duration: i64,
    /// Confirmed cost for the session.
    pub cost_deducted: i64,
    /// Record timestamp.
    pub watched_at: DateTime<Utc>,
}

impl From<WatchRecord> for WatchRecordDto {
    fn from(record: WatchRecord) -> Self {
        Self {
            id: record.id,
            movie_id: record.movie_id,
            watch_duration: record.watch_duration,
            cost_deducted: record.cost_deducted,
            watched_at: record.watched_at,
        }
    }
}

/// List response for `GET /accounts/{user_id}/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WatchHistoryResponse {
    /// History entries, newest first.
    pub data: Vec<WatchRecordDto>,
}

/// Request body for `POST /topups`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitTopUpRequest {
    /// Requesting user.
    pub user_id: Uuid,
    /// Requested amount in smallest currency units.
    pub amount: i64,
    /// Bank / transfer method used.
    pub transfer_method: String,
}

/// Response body for `POST /topups` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitTopUpResponse {
    /// Identifier of the pending request.
    pub request_id: Uuid,
    /// Always `pending` on submission.
    pub status: String,
}

/// A top-up request as seen by an admin.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopUpDto {
    /// Request identifier.
    pub id: Uuid,
    /// Requesting user.
    pub user_id: Uuid,
    /// Requested amount.
    pub amount: i64,
    /// Transfer method declared by the user.
    pub transfer_method: String,
    /// `pending`, `approved`, or `rejected`.
    pub status: String,
    /// Optional note from the resolving admin.
    pub admin_note: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<TopUpRequest> for TopUpDto {
    fn from(request: TopUpRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            amount: request.amount,
            transfer_method: request.transfer_method,
            status: request.status,
            admin_note: request.admin_note,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// List response for `GET /admin/topups`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TopUpListResponse {
    /// Matching requests, newest first.
    pub data: Vec<TopUpDto>,
}

/// Query parameters for `GET /admin/topups`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TopUpListParams {
    /// Status filter. Defaults to `pending`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "pending".to_string()
}

/// Request body for admin top-up resolution.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveTopUpRequest {
    /// Optional note recorded with the resolution.
    #[serde(default)]
    pub admin_note: Option<String>,
}
