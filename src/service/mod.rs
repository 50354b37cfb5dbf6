//! Service layer: orchestration between the HTTP/WebSocket surface and
//! the domain and persistence layers.

pub mod account;
pub mod ip_lookup;
pub mod metering;

pub use account::AccountService;
pub use ip_lookup::IpLookup;
pub use metering::MeteringService;
