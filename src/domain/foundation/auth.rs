//! Authentication types for the domain layer.
//!
//! These types represent the verified identity extracted from a bearer
//! credential. They have **no external dependencies** - the JWT adapter (or a
//! test mock) populates them via the `TokenValidator` port.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{UserId, ValidationError};

/// Platform role carried in every credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Vendor,
    Manager,
    User,
}

impl Role {
    /// Wire representation, as stored in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "vendor" => Ok(Role::Vendor),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Which class of credential is being validated.
///
/// Access and refresh tokens are signed with different secrets, so a refresh
/// token never passes access validation and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity extracted from a validated credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Authentication errors that can occur during token validation.
///
/// These errors are **domain-centric** - they describe what went wrong
/// from the application's perspective, not the JWT library's.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was supplied.
    #[error("Token required")]
    MissingToken,

    /// The token is malformed, has an invalid signature, or is the wrong kind.
    #[error("Invalid token")]
    InvalidToken,

    /// The token signature is valid but it has expired.
    #[error("Token expired")]
    TokenExpired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_name() {
        for role in [Role::Admin, Role::Vendor, Role::Manager, Role::User] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_rejects_unknown_name() {
        assert!("chef".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"manager\"");
    }

    #[test]
    fn authenticated_user_new_creates_user() {
        let user = AuthenticatedUser::new(UserId::new("user-123").unwrap(), Role::Vendor);
        assert_eq!(user.user_id.as_str(), "user-123");
        assert_eq!(user.role, Role::Vendor);
    }

    #[test]
    fn auth_error_messages() {
        assert_eq!(AuthError::MissingToken.to_string(), "Token required");
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
    }
}
