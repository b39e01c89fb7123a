//! Mock authentication adapter for testing.
//!
//! Implements the `TokenValidator` port without any signing secrets, so
//! handler and integration tests can drive the handshake with plain strings.
//!
//! # Example
//!
//! ```ignore
//! use foodcourt_live::adapters::auth::MockTokenValidator;
//! use foodcourt_live::domain::foundation::Role;
//!
//! let validator = MockTokenValidator::new().with_test_user("valid-token", "user-123", Role::User);
//! let result = validator.validate("valid-token", TokenKind::Access).await;
//! assert!(result.is_ok());
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, TokenKind, UserId};
use crate::ports::TokenValidator;

/// Mock token validator for testing.
///
/// Stores a map of access tokens to users. Unknown tokens, and any token
/// validated as a refresh token, return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockTokenValidator {
    /// Map of valid access tokens to their associated users
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockTokenValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a user.
    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.tokens.write().unwrap().insert(token.into(), user);
        self
    }

    /// Adds a valid token for a user built from an id and role.
    pub fn with_test_user(
        self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
    ) -> Self {
        let user = AuthenticatedUser::new(UserId::new(user_id).unwrap(), role);
        self.with_user(token, user)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait]
impl TokenValidator for MockTokenValidator {
    async fn validate(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<AuthenticatedUser, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        if kind != TokenKind::Access {
            return Err(AuthError::InvalidToken);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
