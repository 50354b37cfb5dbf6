//! Persistence layer: store traits and their PostgreSQL implementation.
//!
//! The metering core consumes its collaborators through traits so that the
//! state machine can be exercised against in-memory fakes. The concrete
//! implementation uses `sqlx::PgPool` for async PostgreSQL access.

pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorefrontError;
use models::{Movie, Profile, TopUpRequest, WatchRecord};

/// Result of an atomic conditional decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The decrement was applied; carries the balance after the debit.
    Debited {
        /// Balance remaining after the debit.
        new_balance: i64,
    },
    /// The balance could not cover the amount; nothing was mutated.
    Insufficient,
}

/// Durable per-user balance ledger.
///
/// The only mutation primitive the metering core uses is
/// [`BalanceStore::debit_if_sufficient`], an atomic conditional decrement.
/// The core never performs a non-atomic read-then-write.
#[async_trait]
pub trait BalanceStore: Send + Sync + std::fmt::Debug {
    /// Returns the current balance for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProfileNotFound`] if no profile exists,
    /// or [`StorefrontError::PersistenceError`] on store failure.
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, StorefrontError>;

    /// Decrements the balance by `amount` only if `balance >= amount`,
    /// atomically with respect to all other debits and credits for the
    /// same user.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn debit_if_sufficient(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<DebitOutcome, StorefrontError>;

    /// Increments the balance by `amount`, returning the new balance.
    /// Used only by the admin top-up approval flow.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProfileNotFound`] if no profile exists,
    /// or [`StorefrontError::PersistenceError`] on store failure.
    async fn credit(&self, user_id: Uuid, amount: i64) -> Result<i64, StorefrontError>;
}

/// Read-only movie catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync + std::fmt::Debug {
    /// Returns movies ordered newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn list_movies(&self, limit: i64, offset: i64) -> Result<Vec<Movie>, StorefrontError>;

    /// Returns the total number of movies in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn count_movies(&self) -> Result<i64, StorefrontError>;

    /// Looks up a single movie by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn get_movie(&self, movie_id: Uuid) -> Result<Option<Movie>, StorefrontError>;
}

/// Append-only watch-history recorder.
///
/// Idempotency is the caller's responsibility: the session state machine
/// calls [`HistoryStore::record_watch`] at most once per session.
#[async_trait]
pub trait HistoryStore: Send + Sync + std::fmt::Debug {
    /// Appends one watch-history record.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn record_watch(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        duration_secs: i64,
        cost: i64,
    ) -> Result<Uuid, StorefrontError>;

    /// Returns the user's watch history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchRecord>, StorefrontError>;
}

/// Top-up request intake and admin resolution.
#[async_trait]
pub trait TopUpStore: Send + Sync + std::fmt::Debug {
    /// Creates a pending top-up request, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn submit_request(
        &self,
        user_id: Uuid,
        amount: i64,
        transfer_method: &str,
    ) -> Result<Uuid, StorefrontError>;

    /// Lists top-up requests with the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn list_requests(&self, status: &str) -> Result<Vec<TopUpRequest>, StorefrontError>;

    /// Approves a pending request and credits the user's balance in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::TopUpNotFound`] for an unknown ID,
    /// [`StorefrontError::TopUpAlreadyResolved`] if the request is not
    /// pending, or [`StorefrontError::PersistenceError`] on store failure.
    async fn approve_request(
        &self,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError>;

    /// Rejects a pending request with an optional note.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::TopUpNotFound`] for an unknown ID,
    /// [`StorefrontError::TopUpAlreadyResolved`] if the request is not
    /// pending, or [`StorefrontError::PersistenceError`] on store failure.
    async fn reject_request(
        &self,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError>;
}

/// User profile storage.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug {
    /// Creates a profile for an externally authenticated user, recording
    /// the best-effort client IP alongside it.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidRequest`] if a profile already
    /// exists for the user, or [`StorefrontError::PersistenceError`] on
    /// store failure.
    async fn create_profile(
        &self,
        user_id: Uuid,
        full_name: &str,
        phone: Option<&str>,
        ip_address: &str,
    ) -> Result<Profile, StorefrontError>;

    /// Looks up a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorefrontError>;
}
