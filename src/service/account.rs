//! Account service: registration, profile reads, watch history, and the
//! top-up request flow including admin resolution.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::StorefrontError;
use crate::persistence::models::{Profile, TopUpRequest, WatchRecord};
use crate::persistence::{HistoryStore, ProfileStore, TopUpStore};
use crate::service::ip_lookup::IpLookup;

/// Statuses a top-up listing may filter on.
const TOPUP_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

/// Orchestrates profile and top-up operations on behalf of the handlers.
///
/// Admin operations are gated by a shared access code checked here, not
/// in the handlers, so every caller path goes through the same gate.
#[derive(Debug)]
pub struct AccountService {
    profiles: Arc<dyn ProfileStore>,
    topups: Arc<dyn TopUpStore>,
    history: Arc<dyn HistoryStore>,
    ip_lookup: IpLookup,
    admin_access_code: String,
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        topups: Arc<dyn TopUpStore>,
        history: Arc<dyn HistoryStore>,
        ip_lookup: IpLookup,
        admin_access_code: String,
    ) -> Self {
        Self {
            profiles,
            topups,
            history,
            ip_lookup,
            admin_access_code,
        }
    }

    /// Registers a profile for an externally authenticated user. The
    /// client IP is resolved best-effort and never blocks registration.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidRequest`] for an empty name or a
    /// duplicate profile, or [`StorefrontError::PersistenceError`] on
    /// store failure.
    pub async fn register(
        &self,
        user_id: Uuid,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, StorefrontError> {
        if full_name.trim().is_empty() {
            return Err(StorefrontError::InvalidRequest(
                "full_name must not be empty".to_string(),
            ));
        }

        let ip_address = self.ip_lookup.resolve_client_ip().await;
        let profile = self
            .profiles
            .create_profile(user_id, full_name.trim(), phone, &ip_address)
            .await?;

        tracing::info!(%user_id, ip = %ip_address, "profile registered");
        Ok(profile)
    }

    /// Returns the profile for a user.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::ProfileNotFound`] if no profile exists,
    /// or [`StorefrontError::PersistenceError`] on store failure.
    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, StorefrontError> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or(StorefrontError::ProfileNotFound(user_id))
    }

    /// Returns the user's watch history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::PersistenceError`] on store failure.
    pub async fn watch_history(&self, user_id: Uuid) -> Result<Vec<WatchRecord>, StorefrontError> {
        self.history.watch_history(user_id).await
    }

    /// Submits a top-up request for manual review.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::InvalidRequest`] for a non-positive
    /// amount or empty transfer method, or
    /// [`StorefrontError::PersistenceError`] on store failure.
    pub async fn submit_topup(
        &self,
        user_id: Uuid,
        amount: i64,
        transfer_method: &str,
    ) -> Result<Uuid, StorefrontError> {
        if amount <= 0 {
            return Err(StorefrontError::InvalidRequest(format!(
                "top-up amount must be positive, got {amount}"
            )));
        }
        if transfer_method.trim().is_empty() {
            return Err(StorefrontError::InvalidRequest(
                "transfer_method must not be empty".to_string(),
            ));
        }

        let request_id = self
            .topups
            .submit_request(user_id, amount, transfer_method.trim())
            .await?;
        tracing::info!(%user_id, %request_id, amount, "top-up request submitted");
        Ok(request_id)
    }

    /// Lists top-up requests by status for an admin.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Unauthorized`] for a bad access code,
    /// [`StorefrontError::InvalidRequest`] for an unknown status, or
    /// [`StorefrontError::PersistenceError`] on store failure.
    pub async fn list_topups(
        &self,
        access_code: &str,
        status: &str,
    ) -> Result<Vec<TopUpRequest>, StorefrontError> {
        self.verify_admin(access_code)?;
        if !TOPUP_STATUSES.contains(&status) {
            return Err(StorefrontError::InvalidRequest(format!(
                "unknown top-up status: {status}"
            )));
        }
        self.topups.list_requests(status).await
    }

    /// Approves a pending top-up, crediting the user's balance.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Unauthorized`] for a bad access code,
    /// [`StorefrontError::TopUpNotFound`] for an unknown ID,
    /// [`StorefrontError::TopUpAlreadyResolved`] if already resolved, or
    /// [`StorefrontError::PersistenceError`] on store failure.
    pub async fn approve_topup(
        &self,
        access_code: &str,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError> {
        self.verify_admin(access_code)?;
        let request = self.topups.approve_request(request_id, admin_note).await?;
        tracing::info!(%request_id, user_id = %request.user_id, amount = request.amount, "top-up approved");
        Ok(request)
    }

    /// Rejects a pending top-up.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Unauthorized`] for a bad access code,
    /// [`StorefrontError::TopUpNotFound`] for an unknown ID,
    /// [`StorefrontError::TopUpAlreadyResolved`] if already resolved, or
    /// [`StorefrontError::PersistenceError`] on store failure.
    pub async fn reject_topup(
        &self,
        access_code: &str,
        request_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<TopUpRequest, StorefrontError> {
        self.verify_admin(access_code)?;
        let request = self.topups.reject_request(request_id, admin_note).await?;
        tracing::info!(%request_id, "top-up rejected");
        Ok(request)
    }

    /// Checks the shared admin access code.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Unauthorized`] on mismatch.
    pub fn verify_admin(&self, access_code: &str) -> Result<(), StorefrontError> {
        if access_code == self.admin_access_code {
            Ok(())
        } else {
            Err(StorefrontError::Unauthorized)
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Debug, Default)]
    struct MemProfiles {
        profiles: Mutex<HashMap<Uuid, Profile>>,
    }

    #[async_trait]
    impl ProfileStore for MemProfiles {
        async fn create_profile(
            &self,
            user_id: Uuid,
            full_name: &str,
            phone: Option<&str>,
            ip_address: &str,
        ) -> Result<Profile, StorefrontError> {
            let mut map = self.profiles.lock().await;
            if map.contains_key(&user_id) {
                return Err(StorefrontError::InvalidRequest(format!(
                    "profile already exists for user {user_id}"
                )));
            }
            let now = Utc::now();
            let profile = Profile {
                id: Uuid::new_v4(),
                user_id,
                full_name: full_name.to_string(),
                phone: phone.map(ToString::to_string),
                balance: 0,
                ip_address: Some(ip_address.to_string()),
                created_at: now,
                updated_at: now,
            };
            map.insert(user_id, profile.clone());
            Ok(profile)
        }

        async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorefrontError> {
            Ok(self.profiles.lock().await.get(&user_id).cloned())
        }
    }

    #[derive(Debug, Default)]
    struct MemTopUps {
        requests: Mutex<HashMap<Uuid, TopUpRequest>>,
    }

    #[async_trait]
    impl TopUpStore for MemTopUps {
        async fn submit_request(
            &self,
            user_id: Uuid,
            amount: i64,
            transfer_method: &str,
        ) -> Result<Uuid, StorefrontError> {
            let now = Utc::now();
            let request = TopUpRequest {
                id: Uuid::new_v4(),
                user_id,
                amount,
                transfer_method: transfer_method.to_string(),
                status: "pending".to_string(),
                admin_note: None,
                created_at: now,
                updated_at: now,
            };
            let id = request.id;
            self.requests.lock().await.insert(id, request);
            Ok(id)
        }

        async fn list_requests(&self, status: &str) -> Result<Vec<TopUpRequest>, StorefrontError> {
            Ok(self
                .requests
                .lock()
                .await
                .values()
                .filter(|r| r.status == status)
                .cloned()
                .collect())
        }

        async fn approve_request(
            &self,
            request_id: Uuid,
            admin_note: Option<&str>,
        ) -> Result<TopUpRequest, StorefrontError> {
            let mut map = self.requests.lock().await;
            let request = map
                .get_mut(&request_id)
                .ok_or(StorefrontError::TopUpNotFound(request_id))?;
            if request.status != "pending" {
                return Err(StorefrontError::TopUpAlreadyResolved {
                    id: request_id,
                    status: request.status.clone(),
                });
            }
            request.status = "approved".to_string();
            request.admin_note = admin_note.map(ToString::to_string);
            Ok(request.clone())
        }

        async fn reject_request(
            &self,
            request_id: Uuid,
            admin_note: Option<&str>,
        ) -> Result<TopUpRequest, StorefrontError> {
            let mut map = self.requests.lock().await;
            let request = map
                .get_mut(&request_id)
                .ok_or(StorefrontError::TopUpNotFound(request_id))?;
            if request.status != "pending" {
                return Err(StorefrontError::TopUpAlreadyResolved {
                    id: request_id,
                    status: request.status.clone(),
                });
            }
            request.status = "rejected".to_string();
            request.admin_note = admin_note.map(ToString::to_string);
            Ok(request.clone())
        }
    }

    #[derive(Debug, Default)]
    struct NoHistory;

    #[async_trait]
    impl HistoryStore for NoHistory {
        async fn record_watch(
            &self,
            _user_id: Uuid,
            _movie_id: Uuid,
            _duration_secs: i64,
            _cost: i64,
        ) -> Result<Uuid, StorefrontError> {
            Ok(Uuid::new_v4())
        }

        async fn watch_history(&self, _user_id: Uuid) -> Result<Vec<WatchRecord>, StorefrontError> {
            Ok(Vec::new())
        }
    }

    fn make_service() -> AccountService {
        let Ok(ip_lookup) = IpLookup::new(Vec::new(), Duration::from_secs(1)) else {
            panic!("client build failed");
        };
        AccountService::new(
            Arc::new(MemProfiles::default()),
            Arc::new(MemTopUps::default()),
            Arc::new(NoHistory),
            ip_lookup,
            "011090".to_string(),
        )
    }

    #[tokio::test]
    async fn register_records_fallback_ip_when_lookup_fails() {
        let service = make_service();
        let user_id = Uuid::new_v4();

        let Ok(profile) = service.register(user_id, "Budi Santoso", None).await else {
            panic!("register failed");
        };
        assert_eq!(profile.user_id, user_id);
        assert_eq!(profile.balance, 0);
        assert_eq!(
            profile.ip_address.as_deref(),
            Some(crate::service::ip_lookup::FALLBACK_IP)
        );
    }

    #[tokio::test]
    async fn register_rejects_empty_name_and_duplicates() {
        let service = make_service();
        let user_id = Uuid::new_v4();

        let result = service.register(user_id, "   ", None).await;
        assert!(matches!(result, Err(StorefrontError::InvalidRequest(_))));

        let first = service.register(user_id, "Budi", None).await;
        assert!(first.is_ok());
        let second = service.register(user_id, "Budi", None).await;
        assert!(matches!(second, Err(StorefrontError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn topup_flow_requires_admin_code() {
        let service = make_service();
        let user_id = Uuid::new_v4();

        let Ok(request_id) = service.submit_topup(user_id, 50_000, "BCA").await else {
            panic!("submit failed");
        };

        let denied = service.approve_topup("wrong", request_id, None).await;
        assert!(matches!(denied, Err(StorefrontError::Unauthorized)));

        let Ok(approved) = service.approve_topup("011090", request_id, Some("ok")).await else {
            panic!("approve failed");
        };
        assert_eq!(approved.status, "approved");

        // Already resolved: a second resolution is rejected.
        let again = service.reject_topup("011090", request_id, None).await;
        assert!(matches!(
            again,
            Err(StorefrontError::TopUpAlreadyResolved { .. })
        ));
    }

    #[tokio::test]
    async fn submit_validates_amount_and_method() {
        let service = make_service();
        let user_id = Uuid::new_v4();

        let zero = service.submit_topup(user_id, 0, "BCA").await;
        assert!(matches!(zero, Err(StorefrontError::InvalidRequest(_))));

        let blank = service.submit_topup(user_id, 100, "  ").await;
        assert!(matches!(blank, Err(StorefrontError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn list_rejects_unknown_status() {
        let service = make_service();
        let result = service.list_topups("011090", "maybe").await;
        assert!(matches!(result, Err(StorefrontError::InvalidRequest(_))));
    }
}
