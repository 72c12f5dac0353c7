//! Authentication failure taxonomy.
//!
//! Every check in the login and validation pipelines fails with a distinct
//! variant; callers always see the first failing check, never an
//! aggregation.

use thiserror::Error;

use opsdeck_core::error::{AppError, ErrorKind};

/// Authentication and session control failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Too many failed attempts; locked for the indicated time.
    #[error("account locked, retry in {remaining_minutes} minute(s)")]
    AccountLocked {
        /// Minutes until the lock expires, rounded up.
        remaining_minutes: i64,
    },

    /// The account exists but is disabled.
    #[error("account is disabled")]
    AccountDisabled,

    /// The token subject no longer resolves to an account.
    #[error("account does not exist or is no longer valid")]
    AccountInvalid,

    /// The concurrent device quota is already reached.
    #[error("concurrent login device limit reached")]
    DeviceQuotaExceeded,

    /// The token failed signature or structural validation.
    #[error("invalid token")]
    TokenInvalid,

    /// The token's `exp` has passed.
    #[error("token has expired")]
    TokenExpired,

    /// An account-level revocation or logout postdates the token.
    #[error("credentials revoked, please log in again")]
    Revoked,

    /// This specific session was force-logged-out.
    #[error("this session has been terminated")]
    SessionRevoked,

    /// No activity within the configured idle threshold.
    #[error("logged out due to inactivity")]
    InactiveTimeout,

    /// An admin tried to force-logout their own current session.
    #[error("cannot force logout the current session")]
    SelfRevocationRejected,

    /// Infrastructure failure surfaced through an auth flow.
    #[error(transparent)]
    Internal(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInvalid
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::Revoked
            | AuthError::SessionRevoked
            | AuthError::InactiveTimeout => AppError::new(ErrorKind::Authentication, message),
            AuthError::AccountDisabled => AppError::new(ErrorKind::Authorization, message),
            AuthError::AccountLocked { .. } | AuthError::DeviceQuotaExceeded => {
                AppError::new(ErrorKind::RateLimit, message)
            }
            AuthError::SelfRevocationRejected => AppError::new(ErrorKind::Validation, message),
            AuthError::Internal(inner) => inner,
        }
    }
}
