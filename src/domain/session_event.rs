//! Domain events reflecting metering session state mutations.
//!
//! Every session mutation emits a [`SessionEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers so the
//! player can react to charges and termination without polling.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::SessionId;

/// Terminal outcome of a session, as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Funds ran out mid-session.
    Exhausted,
    /// The user closed the player.
    UserClosed,
    /// A debit failed or timed out with unknown funds state.
    Error,
}

/// Domain event emitted on every session state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Emitted when a session enters Active.
    SessionStarted {
        /// Session identifier.
        session_id: SessionId,
        /// Owner of the metered balance.
        user_id: Uuid,
        /// Movie being played.
        movie_id: Uuid,
        /// Cost per second.
        rate: i64,
        /// Balance at session start.
        starting_balance: i64,
        /// Start timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after each confirmed debit.
    TickCharged {
        /// Session identifier.
        session_id: SessionId,
        /// Fully paid seconds so far.
        elapsed_secs: u64,
        /// Sum of confirmed debits so far.
        cost_deducted: i64,
        /// Balance remaining after this debit.
        balance_remaining: i64,
        /// Tick timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted once per session, on its single terminal transition.
    SessionEnded {
        /// Session identifier.
        session_id: SessionId,
        /// Why the session ended.
        outcome: SessionOutcome,
        /// Total fully paid seconds.
        watch_duration_secs: u64,
        /// Total confirmed debits.
        cost_deducted: i64,
        /// Whether the watch-history record was written.
        history_recorded: bool,
        /// Termination timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns the session ID associated with this event.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::SessionStarted { session_id, .. }
            | Self::TickCharged { session_id, .. }
            | Self::SessionEnded { session_id, .. } => *session_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::TickCharged { .. } => "tick_charged",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn session_started_event_type() {
        let event = SessionEvent::SessionStarted {
            session_id: SessionId::new(),
            user_id: Uuid::new_v4(),
            movie_id: Uuid::new_v4(),
            rate: 1,
            starting_balance: 100,
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "session_started");
    }

    #[test]
    fn tick_charged_serializes() {
        let event = SessionEvent::TickCharged {
            session_id: SessionId::new(),
            elapsed_secs: 7,
            cost_deducted: 7,
            balance_remaining: 93,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("tick_charged"));
        assert!(json.contains("\"balance_remaining\":93"));
    }

    #[test]
    fn session_id_accessor() {
        let id = SessionId::new();
        let event = SessionEvent::SessionEnded {
            session_id: id,
            outcome: SessionOutcome::UserClosed,
            watch_duration_secs: 3,
            cost_deducted: 3,
            history_recorded: true,
            timestamp: Utc::now(),
        };
        assert_eq!(event.session_id(), id);
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&SessionOutcome::UserClosed).unwrap_or_default();
        assert_eq!(json, "\"user_closed\"");
    }
}
