//! Per-request credential validation.
//!
//! Validation runs on every protected request and always consults the
//! freshest log; nothing here is cached across requests. The ordering
//! decision is a pure function over a [`ValidationFacts`] snapshot so every
//! branch is testable without a database. Timestamp comparisons are open
//! (`>=`) so revoke-then-validate races resolve toward revocation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use opsdeck_database::repositories::{AuthEventRepository, SettingsRepository, UserRepository};
use opsdeck_entity::auth_event::AuthAction;
use opsdeck_entity::user::User;

use crate::error::AuthError;
use crate::jwt::{Claims, TokenDecoder};

/// A fully validated request identity.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// The resolved account.
    pub user: User,
    /// The decoded token claims, including the session identifier.
    pub claims: Claims,
}

/// Snapshot of everything the validation decision needs.
#[derive(Debug, Clone, Default)]
pub struct ValidationFacts {
    /// The account the token's subject resolves to, if any.
    pub account: Option<User>,
    /// Timestamp of the latest account-level `force_logout` event.
    pub last_force_logout: Option<DateTime<Utc>>,
    /// Whether any `force_logout_session` event tags this token's session.
    pub session_revoked: bool,
    /// Timestamp of the latest `logout` event.
    pub last_logout: Option<DateTime<Utc>>,
    /// Timestamp of the latest `heartbeat`/`login` event.
    pub last_activity: Option<DateTime<Utc>>,
    /// Idle threshold in milliseconds.
    pub inactive_ms: u64,
}

/// Applies the validation checks in order, failing fast with the first
/// violated rule. Signature and expiry (the step before this one) are
/// handled by [`TokenDecoder::decode`].
pub fn evaluate(
    claims: &Claims,
    facts: &ValidationFacts,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let issued_at = claims.issued_at();

    // Subject must resolve to an active account.
    let Some(account) = &facts.account else {
        return Err(AuthError::AccountInvalid);
    };
    if !account.status.can_login() {
        return Err(AuthError::AccountDisabled);
    }

    // Account-level revocation at or after issuance kills the token.
    if let Some(revoked_at) = facts.last_force_logout {
        if revoked_at >= issued_at {
            return Err(AuthError::Revoked);
        }
    }

    // Any revocation of this exact session is terminal, regardless of
    // ordering relative to issuance.
    if facts.session_revoked {
        return Err(AuthError::SessionRevoked);
    }

    // Voluntary logout at or after issuance also kills the token.
    if let Some(logged_out_at) = facts.last_logout {
        if logged_out_at >= issued_at {
            return Err(AuthError::Revoked);
        }
    }

    // Inactivity: fall back from log activity to the account's recorded
    // login time, then to the token's own issue time.
    let last_active = facts
        .last_activity
        .or(account.last_login_at)
        .unwrap_or(issued_at);
    if (now - last_active).num_milliseconds() >= facts.inactive_ms as i64 {
        return Err(AuthError::InactiveTimeout);
    }

    Ok(())
}

/// Validates tokens on protected requests against the live log.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    /// Signature/expiry validation.
    decoder: Arc<TokenDecoder>,
    /// Account resolution.
    users: Arc<UserRepository>,
    /// Event log store.
    events: Arc<AuthEventRepository>,
    /// Runtime settings (idle threshold).
    settings: Arc<SettingsRepository>,
}

impl RequestAuthenticator {
    /// Creates a new request authenticator.
    pub fn new(
        decoder: Arc<TokenDecoder>,
        users: Arc<UserRepository>,
        events: Arc<AuthEventRepository>,
        settings: Arc<SettingsRepository>,
    ) -> Self {
        Self {
            decoder,
            users,
            events,
            settings,
        }
    }

    /// Runs the full validation pipeline for a raw token string.
    pub async fn validate(&self, token: &str) -> Result<AuthenticatedRequest, AuthError> {
        self.validate_at(token, Utc::now()).await
    }

    /// Runs the full validation pipeline with an explicit current time.
    pub async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedRequest, AuthError> {
        let claims = self.decoder.decode(token)?;
        let facts = self.gather_facts(&claims).await?;
        evaluate(&claims, &facts, now)?;

        let user = facts.account.ok_or(AuthError::AccountInvalid)?;
        Ok(AuthenticatedRequest { user, claims })
    }

    /// Fetches the validation snapshot for one token.
    async fn gather_facts(&self, claims: &Claims) -> Result<ValidationFacts, AuthError> {
        let user_id = claims.user_id();

        let account = self.users.find_by_id(user_id).await?;

        let last_force_logout = self
            .events
            .latest_by_action(user_id, AuthAction::ForceLogout)
            .await?
            .map(|e| e.created_at);

        let session_revoked = self
            .events
            .find_session_revocation(user_id, claims.session_id())
            .await?
            .is_some();

        let last_logout = self
            .events
            .latest_by_action(user_id, AuthAction::Logout)
            .await?
            .map(|e| e.created_at);

        let last_activity = self
            .events
            .latest_activity(user_id)
            .await?
            .map(|e| e.created_at);

        let inactive_ms = self.settings.inactive_ms().await;

        Ok(ValidationFacts {
            account,
            last_force_logout,
            session_revoked,
            last_logout,
            last_activity,
            inactive_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use opsdeck_entity::user::{UserRole, UserStatus};
    use uuid::Uuid;

    const INACTIVE_MS: u64 = 300_000;

    fn user(status: UserStatus) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: String::new(),
            real_name: None,
            role: UserRole::Operator,
            status,
            department_id: None,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    fn claims(issued_at: DateTime<Utc>) -> Claims {
        Claims {
            sub: 1,
            username: "alice".to_string(),
            role: UserRole::Operator,
            jti: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(24)).timestamp(),
        }
    }

    fn live_facts(now: DateTime<Utc>) -> ValidationFacts {
        ValidationFacts {
            account: Some(user(UserStatus::Active)),
            last_force_logout: None,
            session_revoked: false,
            last_logout: None,
            last_activity: Some(now),
            inactive_ms: INACTIVE_MS,
        }
    }

    #[test]
    fn test_valid_token_passes() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1));
        assert!(evaluate(&c, &live_facts(now), now).is_ok());
    }

    #[test]
    fn test_missing_account() {
        let now = Utc::now();
        let c = claims(now);
        let facts = ValidationFacts {
            account: None,
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&c, &facts, now),
            Err(AuthError::AccountInvalid)
        ));
    }

    #[test]
    fn test_disabled_account() {
        let now = Utc::now();
        let c = claims(now);
        let facts = ValidationFacts {
            account: Some(user(UserStatus::Disabled)),
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&c, &facts, now),
            Err(AuthError::AccountDisabled)
        ));
    }

    #[test]
    fn test_revocation_isolates_by_issue_time() {
        let now = Utc::now();
        let revoked_at = now - Duration::minutes(10);

        // Token issued before the revocation: dead, forever.
        let old = claims(now - Duration::minutes(20));
        let facts = ValidationFacts {
            last_force_logout: Some(revoked_at),
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&old, &facts, now),
            Err(AuthError::Revoked)
        ));

        // Token issued after the revocation: unaffected.
        let fresh = claims(now - Duration::minutes(5));
        assert!(evaluate(&fresh, &facts, now).is_ok());
    }

    #[test]
    fn test_revocation_tie_kills_token() {
        let now = Utc::now();
        let issued = now - Duration::minutes(10);
        let c = claims(issued);
        let facts = ValidationFacts {
            last_force_logout: Some(issued),
            ..live_facts(now)
        };
        assert!(matches!(evaluate(&c, &facts, now), Err(AuthError::Revoked)));
    }

    #[test]
    fn test_session_revocation_is_terminal() {
        let now = Utc::now();
        // Session revocation applies regardless of issue-time ordering.
        let c = claims(now - Duration::seconds(1));
        let facts = ValidationFacts {
            session_revoked: true,
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&c, &facts, now),
            Err(AuthError::SessionRevoked)
        ));
    }

    #[test]
    fn test_logout_after_issue_revokes() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(10));
        let facts = ValidationFacts {
            last_logout: Some(now - Duration::minutes(5)),
            ..live_facts(now)
        };
        assert!(matches!(evaluate(&c, &facts, now), Err(AuthError::Revoked)));
    }

    #[test]
    fn test_inactivity_timeout_at_threshold() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(1));

        let idle = ValidationFacts {
            last_activity: Some(now - Duration::milliseconds(INACTIVE_MS as i64)),
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&c, &idle, now),
            Err(AuthError::InactiveTimeout)
        ));

        let active = ValidationFacts {
            last_activity: Some(now - Duration::milliseconds(INACTIVE_MS as i64 - 1)),
            ..live_facts(now)
        };
        assert!(evaluate(&c, &active, now).is_ok());
    }

    #[test]
    fn test_inactivity_fallback_chain() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1));

        // No log activity: falls back to the account's last login time.
        let mut account = user(UserStatus::Active);
        account.last_login_at = Some(now - Duration::hours(2));
        let facts = ValidationFacts {
            account: Some(account),
            last_activity: None,
            ..live_facts(now)
        };
        assert!(matches!(
            evaluate(&c, &facts, now),
            Err(AuthError::InactiveTimeout)
        ));

        // Neither log activity nor last login: falls back to issue time,
        // which is recent here.
        let facts = ValidationFacts {
            account: Some(user(UserStatus::Active)),
            last_activity: None,
            ..live_facts(now)
        };
        assert!(evaluate(&c, &facts, now).is_ok());
    }
}
