//! HS256 JWT adapter for the `TokenValidator` port.
//!
//! Access and refresh tokens are signed with separate shared secrets, so a
//! refresh token can never be replayed as an access token. Claims carry the
//! platform user id and role:
//!
//! ```json
//! { "user_id": "665f...", "role": "vendor", "exp": 1736510400, "iat": 1736509500 }
//! ```
//!
//! # Example
//!
//! ```ignore
//! let validator = JwtTokenValidator::from_config(&config.auth);
//! let user = validator.validate(token, TokenKind::Access).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, TokenKind, UserId};
use crate::ports::TokenValidator;

/// Claims carried by platform tokens.
#[derive(Debug, Serialize, Deserialize)]
struct PlatformClaims {
    user_id: String,
    role: String,
    /// Expiry timestamp (Unix epoch seconds)
    exp: i64,
    /// Issued at timestamp
    iat: i64,
}

/// Validates (and, for tooling and tests, mints) HS256 platform tokens.
pub struct JwtTokenValidator {
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtTokenValidator {
    pub fn new(
        access_secret: SecretString,
        refresh_secret: SecretString,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.access_secret.clone(),
            config.refresh_secret.clone(),
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        )
    }

    fn secret(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access_secret.expose_secret().as_bytes(),
            TokenKind::Refresh => self.refresh_secret.expose_secret().as_bytes(),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Mint a token of `kind` for `user_id` with the configured lifetime.
    pub fn issue(
        &self,
        user_id: &UserId,
        role: Role,
        kind: TokenKind,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = PlatformClaims {
            user_id: user_id.as_str().to_string(),
            role: role.as_str().to_string(),
            exp: now + self.ttl(kind).as_secs() as i64,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret(kind)),
        )
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<PlatformClaims>(
            token,
            &DecodingKey::from_secret(self.secret(kind)),
            &validation,
        )
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = data.claims;
        let user_id = UserId::new(claims.user_id).map_err(|_| AuthError::InvalidToken)?;
        let role: Role = claims.role.parse().map_err(|_| {
            tracing::warn!(role = %claims.role, "Token carries unknown role");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtTokenValidator {
        JwtTokenValidator::new(
            SecretString::new("access-secret-for-tests-0123456789".to_string()),
            SecretString::new("refresh-secret-for-tests-012345678".to_string()),
            Duration::from_secs(900),
            Duration::from_secs(7 * 24 * 3600),
        )
    }

    fn user_id() -> UserId {
        UserId::new("665f0c1e2a9b4c0012ab34cd").unwrap()
    }

    fn sign(claims: &PlatformClaims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn issued_access_token_validates() {
        let validator = validator();
        let token = validator
            .issue(&user_id(), Role::Manager, TokenKind::Access)
            .unwrap();

        let user = validator.validate(&token, TokenKind::Access).await.unwrap();

        assert_eq!(user.user_id, user_id());
        assert_eq!(user.role, Role::Manager);
    }

    #[tokio::test]
    async fn refresh_token_is_rejected_as_access_token() {
        let validator = validator();
        let token = validator
            .issue(&user_id(), Role::User, TokenKind::Refresh)
            .unwrap();

        let result = validator.validate(&token, TokenKind::Access).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn refresh_token_validates_as_refresh() {
        let validator = validator();
        let token = validator
            .issue(&user_id(), Role::User, TokenKind::Refresh)
            .unwrap();

        assert!(validator.validate(&token, TokenKind::Refresh).await.is_ok());
    }

    #[tokio::test]
    async fn expired_token_maps_to_token_expired() {
        let now = Utc::now().timestamp();
        let token = sign(
            &PlatformClaims {
                user_id: "user-1".to_string(),
                role: "user".to_string(),
                exp: now - 3600,
                iat: now - 7200,
            },
            "access-secret-for-tests-0123456789",
        );

        let result = validator().validate(&token, TokenKind::Access).await;

        assert_eq!(result, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn wrong_signature_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign(
            &PlatformClaims {
                user_id: "user-1".to_string(),
                role: "user".to_string(),
                exp: now + 600,
                iat: now,
            },
            "some-other-secret-entirely-000000",
        );

        let result = validator().validate(&token, TokenKind::Access).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn unknown_role_is_invalid() {
        let now = Utc::now().timestamp();
        let token = sign(
            &PlatformClaims {
                user_id: "user-1".to_string(),
                role: "chef".to_string(),
                exp: now + 600,
                iat: now,
            },
            "access-secret-for-tests-0123456789",
        );

        let result = validator().validate(&token, TokenKind::Access).await;

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_and_empty_tokens_are_rejected() {
        let validator = validator();

        assert_eq!(
            validator.validate("not.a.jwt", TokenKind::Access).await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            validator.validate("", TokenKind::Access).await,
            Err(AuthError::MissingToken)
        );
    }
}
