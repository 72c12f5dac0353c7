//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session-level force logout request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceLogoutSessionRequest {
    /// The session to revoke.
    pub session_id: Uuid,
}

/// Targeted notification push request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessageRequest {
    /// The user to deliver to.
    pub user_id: i64,
}
