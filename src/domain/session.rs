//! Metering session entity and its terminal-state machine.
//!
//! A [`MeteringSession`] tracks one playback session: paid elapsed time,
//! confirmed cost, and a state that transitions exactly once from
//! [`SessionState::Active`] to one of three terminal states.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::SessionId;

/// Lifecycle state of a metering session.
///
/// `Active → {Exhausted, UserClosed, Error}`; all non-Active states are
/// terminal and a terminal session never ticks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session is being metered; one debit attempt per second.
    Active,
    /// A debit attempt was declined for insufficient funds.
    Exhausted,
    /// The host (user) closed the player.
    UserClosed,
    /// A debit attempt failed or timed out with unknown funds state.
    Error,
}

impl SessionState {
    /// Returns `true` for any state other than [`SessionState::Active`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::UserClosed => "user_closed",
            Self::Error => "error",
        }
    }
}

/// One playback session bound to a `(user, movie)` pair.
///
/// Transient: lives only in the [`super::SessionRegistry`] while playback
/// runs, and is discarded after its single terminal transition. `elapsed`
/// counts only fully paid ticks and `cost_deducted` is the sum of amounts
/// the balance store actually confirmed — a declined or timed-out tick is
/// neither counted nor charged.
#[derive(Debug)]
pub struct MeteringSession {
    /// Unique session identifier (immutable after creation).
    pub session_id: SessionId,

    /// Owner of the balance being metered.
    pub user_id: Uuid,

    /// Movie being played.
    pub movie_id: Uuid,

    /// Cost per second of playback in smallest currency units.
    pub rate: i64,

    /// Number of fully paid one-second ticks.
    pub elapsed_secs: u64,

    /// Sum of confirmed debits for this session.
    pub cost_deducted: i64,

    /// Current lifecycle state.
    pub state: SessionState,

    /// Whether the final watch-history write succeeded.
    pub history_recorded: bool,

    /// Session start timestamp (immutable after creation).
    pub started_at: DateTime<Utc>,

    /// Timestamp of the last paid tick (start time until the first tick).
    pub last_tick_at: DateTime<Utc>,
}

impl MeteringSession {
    /// Creates a new Active session.
    #[must_use]
    pub fn new(session_id: SessionId, user_id: Uuid, movie_id: Uuid, rate: i64) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            user_id,
            movie_id,
            rate,
            elapsed_secs: 0,
            cost_deducted: 0,
            state: SessionState::Active,
            history_recorded: false,
            started_at: now,
            last_tick_at: now,
        }
    }

    /// Records one confirmed debit: increments elapsed time and adds the
    /// rate to the confirmed cost. Ignored on a terminal session.
    pub fn record_paid_tick(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.cost_deducted = self.cost_deducted.saturating_add(self.rate);
        self.last_tick_at = Utc::now();
    }

    /// Performs the terminal transition to `state`.
    ///
    /// Returns `true` only for the first transition out of Active; later
    /// calls are no-ops returning `false`. Callers gate the single
    /// watch-history write on this return value.
    pub fn end(&mut self, state: SessionState) -> bool {
        if self.state.is_terminal() || !state.is_terminal() {
            return false;
        }
        self.state = state;
        true
    }

    /// Returns a point-in-time summary of the session.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from(self)
    }
}

/// Lightweight snapshot of a session for API responses and list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: SessionId,
    /// Owner of the metered balance.
    pub user_id: Uuid,
    /// Movie being played.
    pub movie_id: Uuid,
    /// Cost per second.
    pub rate: i64,
    /// Fully paid seconds of playback.
    pub elapsed_secs: u64,
    /// Sum of confirmed debits.
    pub cost_deducted: i64,
    /// Lifecycle state at snapshot time.
    pub state: SessionState,
    /// Whether the watch-history record was written.
    pub history_recorded: bool,
    /// Session start timestamp.
    pub started_at: DateTime<Utc>,
    /// Timestamp of the last paid tick.
    pub last_tick_at: DateTime<Utc>,
}

impl From<&MeteringSession> for SessionSummary {
    fn from(session: &MeteringSession) -> Self {
        Self {
            session_id: session.session_id,
            user_id: session.user_id,
            movie_id: session.movie_id,
            rate: session.rate,
            elapsed_secs: session.elapsed_secs,
            cost_deducted: session.cost_deducted,
            state: session.state,
            history_recorded: session.history_recorded,
            started_at: session.started_at,
            last_tick_at: session.last_tick_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_session(rate: i64) -> MeteringSession {
        MeteringSession::new(SessionId::new(), Uuid::new_v4(), Uuid::new_v4(), rate)
    }

    #[test]
    fn new_session_is_active_and_unpaid() {
        let session = make_session(1);
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.elapsed_secs, 0);
        assert_eq!(session.cost_deducted, 0);
        assert!(!session.history_recorded);
    }

    #[test]
    fn paid_ticks_accumulate_elapsed_and_cost() {
        let mut session = make_session(2);
        session.record_paid_tick();
        session.record_paid_tick();
        session.record_paid_tick();
        assert_eq!(session.elapsed_secs, 3);
        assert_eq!(session.cost_deducted, 6);
    }

    #[test]
    fn terminal_session_never_ticks_again() {
        let mut session = make_session(1);
        session.record_paid_tick();
        assert!(session.end(SessionState::Exhausted));

        session.record_paid_tick();
        assert_eq!(session.elapsed_secs, 1);
        assert_eq!(session.cost_deducted, 1);
    }

    #[test]
    fn end_transitions_exactly_once() {
        let mut session = make_session(1);
        assert!(session.end(SessionState::UserClosed));
        assert!(!session.end(SessionState::Exhausted));
        assert!(!session.end(SessionState::Error));
        assert_eq!(session.state, SessionState::UserClosed);
    }

    #[test]
    fn end_rejects_active_target() {
        let mut session = make_session(1);
        assert!(!session.end(SessionState::Active));
        assert_eq!(session.state, SessionState::Active);
    }

    #[test]
    fn terminal_states_are_terminal() {
        assert!(!SessionState::Active.is_terminal());
        assert!(SessionState::Exhausted.is_terminal());
        assert!(SessionState::UserClosed.is_terminal());
        assert!(SessionState::Error.is_terminal());
    }

    #[test]
    fn summary_reflects_session() {
        let mut session = make_session(1);
        session.record_paid_tick();
        let summary = session.summary();
        assert_eq!(summary.session_id, session.session_id);
        assert_eq!(summary.elapsed_secs, 1);
        assert_eq!(summary.cost_deducted, 1);
        assert_eq!(summary.state, SessionState::Active);
    }
}
