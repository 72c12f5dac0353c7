//! # opsdeck-auth
//!
//! The session identity core of Opsdeck. Sessions are never stored as
//! mutable rows: a session exists because a `login` event was appended to
//! the log, and its liveness is recomputed from the log on every query.
//!
//! ## Modules
//!
//! - `jwt` — session token minting and signature/expiry validation
//! - `lockout` — per-username failed-attempt counting with escalating lockout
//! - `presence` — derives session lists and online status from the event log
//! - `revocation` — account-level and per-session forced logout
//! - `quota` — concurrent device limit enforcement at login
//! - `password` — Argon2id password verification
//! - `session` — login/heartbeat/logout flows and per-request validation

pub mod error;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod presence;
pub mod quota;
pub mod revocation;
pub mod session;

pub use error::AuthError;
pub use jwt::{Claims, TokenDecoder, TokenIssuer};
pub use lockout::LoginAttemptGuard;
pub use password::PasswordHasher;
pub use presence::{PresenceService, SessionView};
pub use quota::DeviceQuotaEnforcer;
pub use revocation::RevocationEngine;
pub use session::{RequestAuthenticator, SessionManager};
