//! Presence derivation — session lists and online status computed purely
//! from the authentication event log.

pub mod location;
pub mod resolver;
pub mod service;

pub use location::{LocationLookup, LocationResolver, NoopLocationLookup};
pub use resolver::{SessionView, resolve_sessions};
pub use service::PresenceService;
