//! Metering service: the playback session state machine.
//!
//! Owns the lifecycle of every [`MeteringSession`]: start validation, the
//! per-second debit tick, user cancellation, and the single reconciliation
//! write to watch history on termination. One tokio timer task drives each
//! Active session; the balance store's atomic conditional decrement is the
//! sole serialization point that prevents overdraft across concurrent
//! sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::domain::{
    EventBus, MeteringSession, SessionEvent, SessionId, SessionOutcome, SessionRegistry,
    SessionState, SessionSummary,
};
use crate::error::StorefrontError;
use crate::persistence::{BalanceStore, CatalogStore, DebitOutcome, HistoryStore};

/// Interval between metering ticks: one debit attempt per second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Orchestration layer for all metering session operations.
///
/// Every mutation method follows the pattern: acquire the per-session
/// lock → call the balance store → update the session → emit events →
/// return the result. Ticks for one session are strictly ordered because
/// a single timer task awaits each debit before scheduling the next, and
/// the session lock serializes a tick against a concurrent stop.
#[derive(Debug)]
pub struct MeteringService {
    registry: Arc<SessionRegistry>,
    event_bus: EventBus,
    balances: Arc<dyn BalanceStore>,
    catalog: Arc<dyn CatalogStore>,
    history: Arc<dyn HistoryStore>,
    tick_interval: Duration,
    debit_timeout: Duration,
}

impl MeteringService {
    /// Creates a new `MeteringService`.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        event_bus: EventBus,
        balances: Arc<dyn BalanceStore>,
        catalog: Arc<dyn CatalogStore>,
        history: Arc<dyn HistoryStore>,
        debit_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            event_bus,
            balances,
            catalog,
            history,
            tick_interval: TICK_INTERVAL,
            debit_timeout,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`SessionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Starts a metering session for `(user, movie)` and spawns its timer
    /// task.
    ///
    /// Any existing Active session for the same user is force-closed
    /// first: one device streams at a time.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::MovieNotFound`] if the catalog lookup
    /// misses, [`StorefrontError::InsufficientFunds`] if the balance
    /// cannot cover a single tick, or [`StorefrontError::InvalidRequest`]
    /// for a non-positive rate. The session never enters Active in those
    /// cases.
    pub async fn start_session(
        self: &Arc<Self>,
        user_id: uuid::Uuid,
        movie_id: uuid::Uuid,
        rate: i64,
    ) -> Result<SessionSummary, StorefrontError> {
        if rate <= 0 {
            return Err(StorefrontError::InvalidRequest(format!(
                "rate must be positive, got {rate}"
            )));
        }

        self.catalog
            .get_movie(movie_id)
            .await?
            .ok_or(StorefrontError::MovieNotFound(movie_id))?;

        let balance = self.balances.get_balance(user_id).await?;
        if balance < rate {
            return Err(StorefrontError::InsufficientFunds {
                balance,
                required: rate,
            });
        }

        // Single-session policy: a new start supersedes any running session.
        for stale_id in self.registry.active_for_user(user_id).await {
            tracing::info!(%stale_id, %user_id, "force-closing superseded session");
            if let Err(e) = self.stop_session(stale_id).await {
                tracing::warn!(%stale_id, error = %e, "superseded session close failed");
            }
        }

        let session = MeteringSession::new(SessionId::new(), user_id, movie_id, rate);
        let session_id = self.registry.insert(session).await?;

        let _ = self.event_bus.publish(SessionEvent::SessionStarted {
            session_id,
            user_id,
            movie_id,
            rate,
            starting_balance: balance,
            timestamp: Utc::now(),
        });

        self.spawn_ticker(session_id);

        tracing::info!(%session_id, %user_id, %movie_id, rate, "session started");
        self.summary_of(session_id).await
    }

    /// Performs one metering tick: a single atomic conditional-decrement
    /// attempt against the balance store, bounded by the debit timeout.
    ///
    /// Returns the session state after the tick. A terminal session is
    /// left untouched (its state is returned as-is), so a tick racing a
    /// stop can never charge after termination.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::SessionNotFound`] if the session has
    /// been reaped from the registry.
    pub async fn tick(&self, session_id: SessionId) -> Result<SessionState, StorefrontError> {
        let entry = self.registry.get(session_id).await?;
        let mut session = entry.write().await;

        if session.state.is_terminal() {
            return Ok(session.state);
        }

        let debit = tokio::time::timeout(
            self.debit_timeout,
            self.balances.debit_if_sufficient(session.user_id, session.rate),
        )
        .await;

        match debit {
            Ok(Ok(DebitOutcome::Debited { new_balance })) => {
                session.record_paid_tick();
                let _ = self.event_bus.publish(SessionEvent::TickCharged {
                    session_id,
                    elapsed_secs: session.elapsed_secs,
                    cost_deducted: session.cost_deducted,
                    balance_remaining: new_balance,
                    timestamp: Utc::now(),
                });
                Ok(SessionState::Active)
            }
            Ok(Ok(DebitOutcome::Insufficient)) => {
                // The declined tick is neither counted nor charged.
                if let Err(e) = self.finish(&mut session, SessionOutcome::Exhausted).await {
                    tracing::error!(%session_id, error = %e, "reconciliation after exhaustion failed");
                }
                Ok(SessionState::Exhausted)
            }
            Ok(Err(e)) => {
                tracing::warn!(%session_id, error = %e, "debit failed, ending session");
                if let Err(e) = self.finish(&mut session, SessionOutcome::Error).await {
                    tracing::error!(%session_id, error = %e, "reconciliation after debit failure failed");
                }
                Ok(SessionState::Error)
            }
            Err(_) => {
                // Funds state unknown: never assume the debit landed.
                tracing::warn!(%session_id, "debit timed out, ending session");
                if let Err(e) = self.finish(&mut session, SessionOutcome::Error).await {
                    tracing::error!(%session_id, error = %e, "reconciliation after debit timeout failed");
                }
                Ok(SessionState::Error)
            }
        }
    }

    /// Stops a session on behalf of the host (user closed the player).
    ///
    /// Idempotent: stopping an already terminal session returns its
    /// summary without side effects. Safe to call while a tick is in
    /// flight — the in-flight debit completes first behind the session
    /// lock, and no debit lands afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::SessionNotFound`] if the session does
    /// not exist, or [`StorefrontError::HistoryWriteFailed`] when the
    /// final history write fails (the session still terminates and its
    /// debits stand; the `SessionEnded` event carries the final numbers).
    pub async fn stop_session(
        &self,
        session_id: SessionId,
    ) -> Result<SessionSummary, StorefrontError> {
        let entry = self.registry.get(session_id).await?;
        let mut session = entry.write().await;

        if session.state.is_terminal() {
            return Ok(session.summary());
        }

        let result = self.finish(&mut session, SessionOutcome::UserClosed).await;
        let summary = session.summary();
        drop(session);

        tracing::info!(%session_id, elapsed = summary.elapsed_secs, "session stopped by user");
        result.map(|()| summary)
    }

    /// Returns a snapshot of a live session.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::SessionNotFound`] if the session does
    /// not exist.
    pub async fn get_session(
        &self,
        session_id: SessionId,
    ) -> Result<SessionSummary, StorefrontError> {
        self.summary_of(session_id).await
    }

    /// Returns summaries of all live sessions, optionally filtered by user.
    pub async fn list_sessions(&self, user_filter: Option<uuid::Uuid>) -> Vec<SessionSummary> {
        self.registry.list(user_filter).await
    }

    async fn summary_of(&self, session_id: SessionId) -> Result<SessionSummary, StorefrontError> {
        let entry = self.registry.get(session_id).await?;
        let session = entry.read().await;
        Ok(session.summary())
    }

    /// Performs the single terminal transition and the one reconciliation
    /// write to watch history.
    ///
    /// The history write is attempted exactly once per session, gated by
    /// [`MeteringSession::end`] returning `true`. A failed write is
    /// surfaced as [`StorefrontError::HistoryWriteFailed`] but never rolls
    /// back debits: the balance ledger is the source of truth, history is
    /// audit.
    async fn finish(
        &self,
        session: &mut MeteringSession,
        outcome: SessionOutcome,
    ) -> Result<(), StorefrontError> {
        if !session.end(outcome_state(outcome)) {
            return Ok(());
        }

        let duration = i64::try_from(session.elapsed_secs).unwrap_or(i64::MAX);
        let write = tokio::time::timeout(
            self.debit_timeout,
            self.history.record_watch(
                session.user_id,
                session.movie_id,
                duration,
                session.cost_deducted,
            ),
        )
        .await;

        let result = match write {
            Ok(Ok(_)) => {
                session.history_recorded = true;
                Ok(())
            }
            Ok(Err(e)) => Err(StorefrontError::HistoryWriteFailed(e.to_string())),
            Err(_) => Err(StorefrontError::HistoryWriteFailed(
                "history write timed out".to_string(),
            )),
        };

        let _ = self.event_bus.publish(SessionEvent::SessionEnded {
            session_id: session.session_id,
            outcome,
            watch_duration_secs: session.elapsed_secs,
            cost_deducted: session.cost_deducted,
            history_recorded: session.history_recorded,
            timestamp: Utc::now(),
        });

        tracing::info!(
            session_id = %session.session_id,
            outcome = ?outcome,
            duration = session.elapsed_secs,
            cost = session.cost_deducted,
            "session ended"
        );

        result
    }

    /// Spawns the per-session timer task: one tick per second, strictly
    /// ordered (the next tick is not scheduled until the previous debit
    /// resolved). The task reaps the session from the registry once it
    /// observes a terminal state.
    fn spawn_ticker(self: &Arc<Self>, session_id: SessionId) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(service.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick resolves immediately; consume it so
            // the first debit lands one full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                match service.tick(session_id).await {
                    Ok(SessionState::Active) => {}
                    Ok(_) | Err(_) => break,
                }
            }
            let _ = service.registry.remove(session_id).await;
            tracing::debug!(%session_id, "ticker finished");
        });
    }
}

/// Maps a reported outcome to its terminal session state.
const fn outcome_state(outcome: SessionOutcome) -> SessionState {
    match outcome {
        SessionOutcome::Exhausted => SessionState::Exhausted,
        SessionOutcome::UserClosed => SessionState::UserClosed,
        SessionOutcome::Error => SessionState::Error,
    }
}
