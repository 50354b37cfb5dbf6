//! Concurrent session storage with per-session fine-grained locking.
//!
//! [`SessionRegistry`] stores all live metering sessions in a `HashMap`
//! where each entry is individually protected by a
//! [`tokio::sync::RwLock`]. The per-session lock is what serializes a tick
//! against a concurrent `stop()` for the same session, while sessions for
//! different users proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::SessionId;
use super::session::{MeteringSession, SessionSummary};
use crate::error::StorefrontError;

/// Central store for all live metering sessions.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<MeteringSession>>` for fine-grained per-session locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same session concurrently.
/// - Writes to different sessions are concurrent.
/// - Writes to the same session (tick vs stop) are serialized.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<RwLock<MeteringSession>>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new session into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidRequest`] if a session with the
    /// same ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, session: MeteringSession) -> Result<SessionId, StorefrontError> {
        let session_id = session.session_id;
        let mut map = self.sessions.write().await;
        if map.contains_key(&session_id) {
            return Err(StorefrontError::InvalidRequest(format!(
                "session {session_id} already exists"
            )));
        }
        map.insert(session_id, Arc::new(RwLock::new(session)));
        Ok(session_id)
    }

    /// Returns a shared reference to the session behind its per-session lock.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::SessionNotFound`] if no session with the
    /// given ID exists.
    pub async fn get(
        &self,
        session_id: SessionId,
    ) -> Result<Arc<RwLock<MeteringSession>>, StorefrontError> {
        let map = self.sessions.read().await;
        map.get(&session_id)
            .cloned()
            .ok_or(StorefrontError::SessionNotFound(session_id))
    }

    /// Removes a session from the registry.
    ///
    /// The entry may still be referenced by an in-flight ticker task, so
    /// only the map slot is released here; the session itself is dropped
    /// with the last `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::SessionNotFound`] if no session with the
    /// given ID exists.
    pub async fn remove(&self, session_id: SessionId) -> Result<(), StorefrontError> {
        let mut map = self.sessions.write().await;
        map.remove(&session_id)
            .map(|_| ())
            .ok_or(StorefrontError::SessionNotFound(session_id))
    }

    /// Returns summaries of all sessions, optionally filtered by user.
    pub async fn list(&self, user_filter: Option<Uuid>) -> Vec<SessionSummary> {
        let map = self.sessions.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let session = entry_lock.read().await;
            if let Some(user_id) = user_filter
                && session.user_id != user_id
            {
                continue;
            }
            summaries.push(session.summary());
        }
        summaries
    }

    /// Returns the IDs of all Active sessions owned by the given user.
    ///
    /// Used by the single-session policy: starting a new session
    /// force-closes these first.
    pub async fn active_for_user(&self, user_id: Uuid) -> Vec<SessionId> {
        let map = self.sessions.read().await;
        let mut ids = Vec::new();
        for entry_lock in map.values() {
            let session = entry_lock.read().await;
            if session.user_id == user_id && !session.state.is_terminal() {
                ids.push(session.session_id);
            }
        }
        ids
    }

    /// Returns the number of sessions in the registry.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns `true` if the registry contains no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::session::SessionState;

    fn make_session(user_id: Uuid) -> MeteringSession {
        MeteringSession::new(SessionId::new(), user_id, Uuid::new_v4(), 1)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = SessionRegistry::new();
        let session = make_session(Uuid::new_v4());
        let id = session.session_id;

        let result = registry.insert(session).await;
        assert!(result.is_ok());

        let fetched = registry.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = SessionRegistry::new();
        let result = registry.get(SessionId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_releases_slot() {
        let registry = SessionRegistry::new();
        let session = make_session(Uuid::new_v4());
        let id = session.session_id;

        let _ = registry.insert(session).await;
        assert!(registry.remove(id).await.is_ok());
        assert!(registry.get(id).await.is_err());
    }

    #[tokio::test]
    async fn remove_nonexistent_returns_error() {
        let registry = SessionRegistry::new();
        let result = registry.remove(SessionId::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_filters_by_user() {
        let registry = SessionRegistry::new();
        let user = Uuid::new_v4();
        let _ = registry.insert(make_session(user)).await;
        let _ = registry.insert(make_session(Uuid::new_v4())).await;

        let all = registry.list(None).await;
        assert_eq!(all.len(), 2);

        let mine = registry.list(Some(user)).await;
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn active_for_user_skips_terminal() {
        let registry = SessionRegistry::new();
        let user = Uuid::new_v4();

        let active = make_session(user);
        let active_id = active.session_id;
        let _ = registry.insert(active).await;

        let mut closed = make_session(user);
        let _ = closed.end(SessionState::UserClosed);
        let _ = registry.insert(closed).await;

        let ids = registry.active_for_user(user).await;
        assert_eq!(ids, vec![active_id]);
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);

        let _ = registry.insert(make_session(Uuid::new_v4())).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
