//! Per-connection subscription manager.
//!
//! Tracks which sessions a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::SessionId;

/// Manages the session subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed session IDs. Ignored while `subscribe_all` is set.
    session_ids: HashSet<SessionId>,
    /// Whether the client subscribes to all sessions (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds session IDs to the subscription set. `wildcard` enables the
    /// match-all filter.
    pub fn subscribe(&mut self, ids: &[SessionId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.session_ids.insert(*id);
        }
    }

    /// Removes session IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[SessionId]) {
        for id in ids {
            self.session_ids.remove(id);
        }
    }

    /// Returns `true` if the given session matches the filter.
    #[must_use]
    pub fn matches(&self, session_id: SessionId) -> bool {
        self.subscribe_all || self.session_ids.contains(&session_id)
    }

    /// Returns the number of explicitly subscribed sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.session_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(SessionId::new()));
    }

    #[test]
    fn subscribe_specific_session() {
        let mut mgr = SubscriptionManager::new();
        let id = SessionId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(SessionId::new()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(SessionId::new()));
    }

    #[test]
    fn unsubscribe_removes_session() {
        let mut mgr = SubscriptionManager::new();
        let id = SessionId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(id));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[SessionId::new(), SessionId::new()], false);
        assert_eq!(mgr.count(), 2);
    }
}
