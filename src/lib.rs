//! # bioskop-gateway
//!
//! REST API and WebSocket gateway for a pay-per-second movie streaming
//! storefront.
//!
//! Users hold a prepaid balance and pay for playback one second at a
//! time: while a movie plays, a metering session debits the balance at a
//! fixed rate until funds run out or the user stops watching. Balances
//! are funded through manually reviewed top-up requests.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── MeteringService, AccountService (service/)
//!     ├── EventBus, SessionRegistry (domain/)
//!     │
//!     └── PostgreSQL Persistence (balances, catalog,
//!         watch history, top-ups)
//! ```
//!
//! The metering core never trusts a local balance read: every charged
//! second is an atomic conditional decrement in the store, so the balance
//! can never go negative no matter how many sessions race.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
