//! Session lifecycle flows — login, heartbeat, logout.
//!
//! No session row is ever written: a login appends a `login` event carrying
//! the freshly minted session identifier, and everything downstream derives
//! from the log.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use opsdeck_database::repositories::{AuthEventRepository, UserRepository};
use opsdeck_entity::auth_event::{AuthAction, CreateAuthEvent, session_tag};
use opsdeck_entity::user::User;

use crate::error::AuthError;
use crate::jwt::TokenIssuer;
use crate::lockout::LoginAttemptGuard;
use crate::password::PasswordHasher;
use crate::presence::LocationResolver;
use crate::quota::DeviceQuotaEnforcer;

/// Request origin details recorded on every appended event.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Origin IP address.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The signed session token.
    pub token: String,
    /// The minted session identifier.
    pub session_id: Uuid,
    /// Token expiration.
    pub expires_at: chrono::DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

/// Drives the login, heartbeat, and logout flows.
#[derive(Clone)]
pub struct SessionManager {
    /// User account lookups and last-login stamping.
    users: Arc<UserRepository>,
    /// Event log store.
    events: Arc<AuthEventRepository>,
    /// Failed-attempt tracking.
    guard: Arc<LoginAttemptGuard>,
    /// Concurrent device quota.
    quota: Arc<DeviceQuotaEnforcer>,
    /// Token minting.
    issuer: Arc<TokenIssuer>,
    /// Password verification.
    hasher: Arc<PasswordHasher>,
    /// IP location stamping for appended events.
    location: Arc<LocationResolver>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        users: Arc<UserRepository>,
        events: Arc<AuthEventRepository>,
        guard: Arc<LoginAttemptGuard>,
        quota: Arc<DeviceQuotaEnforcer>,
        issuer: Arc<TokenIssuer>,
        hasher: Arc<PasswordHasher>,
        location: Arc<LocationResolver>,
    ) -> Self {
        Self {
            users,
            events,
            guard,
            quota,
            issuer,
            hasher,
            location,
        }
    }

    /// Performs the complete login flow:
    ///
    /// 1. Lockout check
    /// 2. Account lookup + password verification (failures feed the guard)
    /// 3. Account status check
    /// 4. Device quota check (does not feed the guard)
    /// 5. Reset the guard, stamp last login
    /// 6. Mint the session token and append the `login` event
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<LoginOutcome, AuthError> {
        let now = Utc::now();

        let lock = self.guard.check_lockout(username, now);
        if lock.locked {
            warn!(username, remaining = lock.remaining_minutes, "Login while locked out");
            return Err(AuthError::AccountLocked {
                remaining_minutes: lock.remaining_minutes,
            });
        }

        let Some(user) = self.users.find_by_username(username).await? else {
            let failure = self.guard.record_failure(username, now);
            info!(username, attempts = failure.attempts, "Login failed: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            let failure = self.guard.record_failure(username, now);
            info!(
                username,
                attempts = failure.attempts,
                lockout_minutes = failure.lockout_minutes,
                "Login failed: wrong password"
            );
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        self.quota.check(user.id, now).await?;

        self.guard.reset(username);
        self.users.update_last_login(user.id, now).await?;

        let issued = self.issuer.issue_at(&user, now)?;
        let location = self.location.resolve(&client.ip_address).await;
        self.events
            .append(&CreateAuthEvent {
                user_id: Some(user.id),
                action: AuthAction::Login,
                module: "auth".to_string(),
                description: session_tag(issued.session_id),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                ip_location: Some(location),
            })
            .await?;

        info!(
            user_id = user.id,
            session_id = %issued.session_id,
            "Login successful"
        );

        Ok(LoginOutcome {
            token: issued.token,
            session_id: issued.session_id,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Records a heartbeat for online-status tracking.
    pub async fn heartbeat(
        &self,
        user_id: i64,
        session_id: Uuid,
        client: &ClientInfo,
    ) -> Result<(), AuthError> {
        let location = self.location.resolve(&client.ip_address).await;
        self.events
            .append(&CreateAuthEvent {
                user_id: Some(user_id),
                action: AuthAction::Heartbeat,
                module: "auth".to_string(),
                description: session_tag(session_id),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                ip_location: Some(location),
            })
            .await?;
        Ok(())
    }

    /// Performs a voluntary logout.
    ///
    /// Appends three events: a session-level revocation of the current
    /// session, an account-level revocation, and the `logout` marker the
    /// request validator checks against token issue times.
    pub async fn logout(
        &self,
        user_id: i64,
        session_id: Uuid,
        client: &ClientInfo,
    ) -> Result<(), AuthError> {
        let location = self.location.resolve(&client.ip_address).await;

        self.events
            .append(&CreateAuthEvent {
                user_id: Some(user_id),
                action: AuthAction::ForceLogoutSession,
                module: "auth".to_string(),
                description: session_tag(session_id),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                ip_location: Some(location.clone()),
            })
            .await?;

        self.events
            .append(&CreateAuthEvent {
                user_id: Some(user_id),
                action: AuthAction::ForceLogout,
                module: "auth".to_string(),
                description: "user logout (all sessions offline)".to_string(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                ip_location: Some(location.clone()),
            })
            .await?;

        self.events
            .append(&CreateAuthEvent {
                user_id: Some(user_id),
                action: AuthAction::Logout,
                module: "auth".to_string(),
                description: "user logout".to_string(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                ip_location: Some(location),
            })
            .await?;

        info!(user_id, session_id = %session_id, "Logout recorded");
        Ok(())
    }
}
