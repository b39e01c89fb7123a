//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, auth types and error types that form the
//! vocabulary of the broadcast service.

mod action;
mod auth;
mod errors;
mod ids;

pub use action::BroadcastAction;
pub use auth::{AuthError, AuthenticatedUser, Role, TokenKind};
pub use errors::ValidationError;
pub use ids::{ClientId, UserId};
