//! Domain layer: core types, session registry, and event system.
//!
//! This module contains the server-side domain model including session
//! identity, the metering session state machine, the event bus for
//! broadcasting state changes, and the session registry for concurrent
//! session storage.

pub mod event_bus;
pub mod session;
pub mod session_event;
pub mod session_id;
pub mod session_registry;

pub use event_bus::EventBus;
pub use session::{MeteringSession, SessionState, SessionSummary};
pub use session_event::{SessionEvent, SessionOutcome};
pub use session_id::SessionId;
pub use session_registry::SessionRegistry;
