//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::CatalogStore;
use crate::service::{AccountService, MeteringService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Metering session orchestration.
    pub metering: Arc<MeteringService>,
    /// Profiles, watch history, and the top-up flow.
    pub accounts: Arc<AccountService>,
    /// Read-only movie catalog.
    pub catalog: Arc<dyn CatalogStore>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Cost of one second of playback in smallest currency units.
    pub rate_per_second: i64,
}
