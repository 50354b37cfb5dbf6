//! Gateway error types with HTTP status code mapping.
//!
//! [`StorefrontError`] is the central error type for the gateway. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient funds: balance 0, need 1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation/Auth   | 400 / 401                    |
/// | 2000–2999 | State/Not Found   | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 / 504                    |
/// | 4000–4999 | Funds/Metering    | 402 Payment Required         |
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// Movie with the given ID was not found in the catalog.
    #[error("movie not found: {0}")]
    MovieNotFound(uuid::Uuid),

    /// Metering session with the given ID was not found.
    #[error("session not found: {0}")]
    SessionNotFound(crate::domain::SessionId),

    /// Profile for the given user ID was not found.
    #[error("profile not found for user {0}")]
    ProfileNotFound(uuid::Uuid),

    /// Top-up request with the given ID was not found.
    #[error("top-up request not found: {0}")]
    TopUpNotFound(uuid::Uuid),

    /// Top-up request was already approved or rejected.
    #[error("top-up request {id} already resolved with status {status}")]
    TopUpAlreadyResolved {
        /// Request identifier.
        id: uuid::Uuid,
        /// Current terminal status of the request.
        status: String,
    },

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Admin access code check failed.
    #[error("invalid admin access code")]
    Unauthorized,

    /// Balance cannot cover even a single metering tick.
    #[error("insufficient funds: balance {balance}, need {required}")]
    InsufficientFunds {
        /// Current balance in smallest currency units.
        balance: i64,
        /// Amount required for one tick.
        required: i64,
    },

    /// A balance store call did not resolve within its budget; funds state
    /// is unknown and no success is assumed.
    #[error("balance debit timed out for user {0}")]
    DebitTimeout(uuid::Uuid),

    /// The final watch-history write failed. Non-fatal to balance
    /// correctness; the session still terminated cleanly.
    #[error("watch-history write failed: {0}")]
    HistoryWriteFailed(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized => 1002,
            Self::MovieNotFound(_) => 2001,
            Self::SessionNotFound(_) => 2002,
            Self::ProfileNotFound(_) => 2003,
            Self::TopUpNotFound(_) => 2004,
            Self::TopUpAlreadyResolved { .. } => 2005,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::HistoryWriteFailed(_) => 3002,
            Self::DebitTimeout(_) => 3003,
            Self::InsufficientFunds { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MovieNotFound(_)
            | Self::SessionNotFound(_)
            | Self::ProfileNotFound(_)
            | Self::TopUpNotFound(_) => StatusCode::NOT_FOUND,
            Self::TopUpAlreadyResolved { .. } => StatusCode::CONFLICT,
            Self::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::DebitTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::HistoryWriteFailed(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_maps_to_payment_required() {
        let err = StorefrontError::InsufficientFunds {
            balance: 0,
            required: 1,
        };
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err.error_code(), 4001);
    }

    #[test]
    fn not_found_variants_map_to_404() {
        let movie = StorefrontError::MovieNotFound(uuid::Uuid::new_v4());
        assert_eq!(movie.status_code(), StatusCode::NOT_FOUND);

        let session = StorefrontError::SessionNotFound(crate::domain::SessionId::new());
        assert_eq!(session.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn debit_timeout_is_gateway_timeout() {
        let err = StorefrontError::DebitTimeout(uuid::Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.error_code(), 3003);
    }

    #[test]
    fn error_response_body_shape() {
        let err = StorefrontError::Unauthorized;
        let body = ErrorResponse {
            error: ErrorBody {
                code: err.error_code(),
                message: err.to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap_or_default();
        assert!(json.contains("\"code\":1002"));
        assert!(json.contains("invalid admin access code"));
        assert!(!json.contains("details"));
    }
}
