//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Movie, Profile, TopUpRequest, WatchRecord};
use super::{BalanceStore, CatalogStore, DebitOutcome, HistoryStore, ProfileStore, TopUpStore};
use crate::error::StorefrontError;

/// PostgreSQL-backed store implementing every persistence trait, using
/// `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(e: sqlx::Error) -> StorefrontError {
    StorefrontError::PersistenceError(e.to_string())
}

#[async_trait]
impl BalanceStore for PostgresStore {
    async fn get_balance(&self, user_id: Uuid) -> Result<i64, StorefrontError> {
        let balance =
            sqlx::query_scalar::<_, i64>("SELECT balance FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        balance.ok_or(StorefrontError::ProfileNotFound(user_id))
    }

    async fn debit_if_sufficient(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<DebitOutcome, StorefrontError> {
        // Single conditional UPDATE: the WHERE clause makes the decrement
        // atomic with respect to every other debit and credit for the row.
        let new_balance = sqlx::query_scalar::<_, i64>(
            "UPDATE profiles SET balance = balance - $2, updated_at = now() \
             WHERE user_id = $1 AND balance >= $2 RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        // No row matched: balance below amount (or profile gone, which the
        // metering core treats the same way — the debit did not happen).
        Ok(new_balance.map_or(DebitOutcome::Insufficient, |new_balance| {
            DebitOutcome::Debited { new_balance }
        }))
    }

    async fn credit(&self, user_id: Uuid, amount: i64) -> Result<i64, StorefrontError> {
        let new_balance = sqlx::query_scalar::<_, i64>(
            "UPDATE profiles SET balance = balance + $2, updated_at = now() \
             WHERE user_id = $1 RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        new_balance.ok_or(StorefrontError::ProfileNotFound(user_id))
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn list_movies(&self, limit: i64, offset: i64) -> Result<Vec<Movie>, StorefrontError> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, thumbnail_url, playback_url, created_at, updated_at \
             FROM movies ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn count_movies(&self) -> Result<i64, StorefrontError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn get_movie(&self, movie_id: Uuid) -> Result<Option<Movie>, StorefrontError> {
        sqlx::query_as::<_, Movie>(
            "SELECT id, title, description, thumbnail_url, playback_url, created_at, updated_at \
             FROM movies WHERE id = $1",
        )
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }
}

#[async_trait]
impl HistoryStore for PostgresStore {
    async fn record_watch(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        duration_secs: i64,
        cost: i64,
    ) -> Result<Uuid, StorefrontError> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO watch_history (user_id, movie_id, watch_duration, cost_deducted) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(duration_secs)
        .bind(cost)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchRecord>, StorefrontError> {
        sqlx::query_as::<_, WatchRecord>(
            "SELECT id, user_id, movie_id, watch_duration, cost_deducted, watched_at \
             FROM watch_history WHERE user_id = $1 ORDER BY watched_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }
}

const TOPUP_COLUMNS: &str =
    "id, user_id, amount, transfer_method, status, admin_note, created_at, updated_at";

#[async_trait]
impl TopUpStore for PostgresStore {
    async fn submit_request(
        &self,
        user_id: Uuid,
        amount: i64,
        transfer_method: &str,
    ) -> Result<Uuid, StorefrontError> {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO topup_requests (user_id, amount, transfer_method, status) \
             VALUES ($1, $2, $3, 'pending') RETURNING id",
        )
        .bind(user_id)
        .bind(amount)
        .bind(transfer_method)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn list_requests(&self, status: &str) -> Result<Vec<TopUpRequest>, StorefrontError> {
        sqlx::query_as::<_, TopUpRequest>(&format!(
            "SELECT {TOPUP_COLUMNS} FROM topup_requests WHERE status = $1 \
             ORDER BY created_at DESC",
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn approve_request(
        &self,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // Lock the row so two admins cannot approve the same request.
        let request = sqlx::query_as::<_, TopUpRequest>(&format!(
            "SELECT {TOPUP_COLUMNS} FROM topup_requests WHERE id = $1 FOR UPDATE",
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?
        .ok_or(StorefrontError::TopUpNotFound(request_id))?;

        if request.status != "pending" {
            return Err(StorefrontError::TopUpAlreadyResolved {
                id: request_id,
                status: request.status,
            });
        }

        let updated = sqlx::query_as::<_, TopUpRequest>(&format!(
            "UPDATE topup_requests SET status = 'approved', admin_note = $2, updated_at = now() \
             WHERE id = $1 RETURNING {TOPUP_COLUMNS}",
        ))
        .bind(request_id)
        .bind(admin_note)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "UPDATE profiles SET balance = balance + $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(updated.user_id)
        .bind(updated.amount)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    async fn reject_request(
        &self,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError> {
        let updated = sqlx::query_as::<_, TopUpRequest>(&format!(
            "UPDATE topup_requests SET status = 'rejected', admin_note = $2, updated_at = now() \
             WHERE id = $1 AND status = 'pending' RETURNING {TOPUP_COLUMNS}",
        ))
        .bind(request_id)
        .bind(admin_note)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match updated {
            Some(request) => Ok(request),
            None => {
                // Distinguish unknown ID from an already-resolved request.
                let status = sqlx::query_scalar::<_, String>(
                    "SELECT status FROM topup_requests WHERE id = $1",
                )
                .bind(request_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

                match status {
                    Some(status) => Err(StorefrontError::TopUpAlreadyResolved {
                        id: request_id,
                        status,
                    }),
                    None => Err(StorefrontError::TopUpNotFound(request_id)),
                }
            }
        }
    }
}

#[async_trait]
impl ProfileStore for PostgresStore {
    async fn create_profile(
        &self,
        user_id: Uuid,
        full_name: &str,
        phone: Option<&str>,
        ip_address: &str,
    ) -> Result<Profile, StorefrontError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, full_name, phone, ip_address) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, user_id, full_name, phone, balance, ip_address, created_at, updated_at",
        )
        .bind(user_id)
        .bind(full_name)
        .bind(phone)
        .bind(ip_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorefrontError::InvalidRequest(format!("profile already exists for user {user_id}"))
            }
            other => db_err(other),
        })?;

        // First-seen IP registration; the lookup sentinel is not an IP.
        if ip_address != crate::service::ip_lookup::FALLBACK_IP {
            sqlx::query(
                "INSERT INTO ip_registrations (ip_address) VALUES ($1) \
                 ON CONFLICT (ip_address) DO NOTHING",
            )
            .bind(ip_address)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        Ok(profile)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorefrontError> {
        sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, full_name, phone, balance, ip_address, created_at, updated_at \
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }
}
