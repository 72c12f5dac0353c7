//! Authentication event log entities.
//!
//! `auth_events` is the append-only foundation of the session subsystem:
//! sessions and online status are never stored as mutable rows, they are
//! derived by replaying these events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Marker prefix embedding a session identifier into an event description.
const SESSION_TAG: &str = "session:";

/// Authentication-relevant event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    /// Successful login; description carries the minted session id.
    Login,
    /// Client activity report; description carries the session id.
    Heartbeat,
    /// Voluntary logout.
    Logout,
    /// Account-level revocation: all sessions last active at or before this
    /// event are logically offline.
    ForceLogout,
    /// Session-level revocation: only the session tagged in the description
    /// is revoked.
    ForceLogoutSession,
}

impl AuthAction {
    /// Return the action as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Heartbeat => "heartbeat",
            Self::Logout => "logout",
            Self::ForceLogout => "force_logout",
            Self::ForceLogoutSession => "force_logout_session",
        }
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable row of the authentication event log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthEvent {
    /// Unique event identifier.
    pub id: i64,
    /// The user this event concerns. Nullable for events recorded before
    /// the subject could be resolved.
    pub user_id: Option<i64>,
    /// What happened.
    pub action: AuthAction,
    /// Originating module (`auth`, `user`, ...).
    pub module: String,
    /// Free text; session-scoped events embed `session:<uuid>` here.
    pub description: String,
    /// Request origin IP.
    pub ip_address: String,
    /// Request User-Agent header.
    pub user_agent: String,
    /// Resolved IP location, backfilled lazily.
    pub ip_location: Option<String>,
    /// When the event was appended.
    pub created_at: DateTime<Utc>,
}

impl AuthEvent {
    /// Extract the session identifier embedded in the description, if any.
    pub fn session_ref(&self) -> Option<Uuid> {
        parse_session_ref(&self.description)
    }
}

/// Data required to append a new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthEvent {
    /// The user this event concerns.
    pub user_id: Option<i64>,
    /// What happened.
    pub action: AuthAction,
    /// Originating module.
    pub module: String,
    /// Free text; use [`session_tag`] to embed a session id.
    pub description: String,
    /// Request origin IP.
    pub ip_address: String,
    /// Request User-Agent header.
    pub user_agent: String,
    /// Resolved IP location, if already known.
    pub ip_location: Option<String>,
}

/// Format a session identifier for embedding into an event description.
pub fn session_tag(session_id: Uuid) -> String {
    format!("{SESSION_TAG}{session_id}")
}

/// Parse a `session:<uuid>` tag out of a description string.
///
/// The tag may appear anywhere in the text; the first occurrence wins.
/// Malformed identifiers are treated as absent rather than as errors, so
/// legacy rows without a parseable tag fall back to device grouping.
pub fn parse_session_ref(description: &str) -> Option<Uuid> {
    let start = description.find(SESSION_TAG)? + SESSION_TAG.len();
    let tail = &description[start..];
    let end = tail
        .find(|c: char| !c.is_ascii_hexdigit() && c != '-')
        .unwrap_or(tail.len());
    Uuid::parse_str(&tail[..end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_ref() {
        let sid = Uuid::new_v4();
        assert_eq!(parse_session_ref(&session_tag(sid)), Some(sid));
        assert_eq!(
            parse_session_ref(&format!("admin kicked {}", session_tag(sid))),
            Some(sid)
        );
        assert_eq!(
            parse_session_ref(&format!("{} (expired)", session_tag(sid))),
            Some(sid)
        );
    }

    #[test]
    fn test_parse_session_ref_absent_or_malformed() {
        assert_eq!(parse_session_ref("user logged out"), None);
        assert_eq!(parse_session_ref("session:not-a-uuid"), None);
        assert_eq!(parse_session_ref(""), None);
    }
}
