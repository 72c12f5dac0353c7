//! Session flows: login, heartbeat, logout, and per-request validation.

pub mod authenticator;
pub mod manager;

pub use authenticator::{AuthenticatedRequest, RequestAuthenticator, ValidationFacts};
pub use manager::{ClientInfo, LoginOutcome, SessionManager};
