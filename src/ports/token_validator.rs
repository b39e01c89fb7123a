//! Token validation port for bearer credentials.
//!
//! Issuance of credentials belongs to the auth service; this crate only
//! consumes a verified identity and role. The WebSocket handshake depends on
//! this port, never on a concrete JWT implementation.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, TokenKind};

/// Validates bearer tokens and extracts the caller's identity.
///
/// # Contract
///
/// Implementations must:
/// - Verify the signature with the secret belonging to `kind`
/// - Reject expired tokens with `AuthError::TokenExpired`
/// - Reject every other failure (malformed, bad signature, wrong kind,
///   unknown role) with `AuthError::InvalidToken`
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate `token` as a credential of the given kind.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw token (no `Bearer ` prefix)
    /// * `kind` - Access for request/handshake auth, refresh for renewal
    async fn validate(&self, token: &str, kind: TokenKind)
        -> Result<AuthenticatedUser, AuthError>;
}
