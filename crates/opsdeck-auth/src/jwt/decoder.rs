//! Session token signature and expiry validation.
//!
//! This is only the first step of request validation: revocation and
//! inactivity checks against the event log live in
//! [`crate::session::authenticator`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use opsdeck_core::config::AuthConfig;

use crate::error::AuthError;

use super::claims::Claims;

/// Validates session token signatures and expiry.
#[derive(Clone)]
pub struct TokenDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes a token string, checking signature and expiry only.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::TokenIssuer;
    use chrono::{Duration, Utc};
    use opsdeck_core::config::AuthConfig;
    use opsdeck_entity::user::{User, UserRole, UserStatus};

    fn test_config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl_hours: 24,
        }
    }

    fn test_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            password_hash: String::new(),
            real_name: None,
            role: UserRole::Operator,
            status: UserStatus::Active,
            department_id: None,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let config = test_config("test-secret");
        let issuer = TokenIssuer::new(&config);
        let decoder = TokenDecoder::new(&config);

        let issued = issuer.issue(&test_user()).unwrap();
        let claims = decoder.decode(&issued.token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.jti, issued.session_id);
    }

    #[test]
    fn test_fresh_session_id_per_issue() {
        let config = test_config("test-secret");
        let issuer = TokenIssuer::new(&config);
        let user = test_user();

        let a = issuer.issue(&user).unwrap();
        let b = issuer.issue(&user).unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenIssuer::new(&test_config("secret-a"));
        let decoder = TokenDecoder::new(&test_config("secret-b"));

        let issued = issuer.issue(&test_user()).unwrap();
        assert!(matches!(
            decoder.decode(&issued.token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token() {
        let config = test_config("test-secret");
        let issuer = TokenIssuer::new(&config);
        let decoder = TokenDecoder::new(&config);

        let issued = issuer
            .issue_at(&test_user(), Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(
            decoder.decode(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let decoder = TokenDecoder::new(&test_config("test-secret"));
        assert!(matches!(
            decoder.decode("not-a-token"),
            Err(AuthError::TokenInvalid)
        ));
    }
}
