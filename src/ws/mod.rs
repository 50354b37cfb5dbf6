//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes metering events to the player
//! so it can show the running cost and react to termination without
//! polling.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
