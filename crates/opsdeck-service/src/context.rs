//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opsdeck_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted by the API layer and passed into service methods so that
/// every operation knows *who* is acting and from *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: i64,
    /// The current session identifier from the token's `jti`.
    pub session_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The username (convenience field from token claims).
    pub username: String,
    /// The user's department, for the REST notification filter.
    pub department_id: Option<i64>,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: i64,
        session_id: Uuid,
        role: UserRole,
        username: String,
        department_id: Option<i64>,
        ip_address: String,
        user_agent: String,
    ) -> Self {
        Self {
            user_id,
            session_id,
            role,
            username,
            department_id,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user may administer other sessions.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
