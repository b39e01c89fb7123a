//! Authentication adapters.
//!
//! Implementations of the `TokenValidator` port:
//!
//! - `jwt` - HS256 platform tokens (production)
//! - `mock` - Test implementation that doesn't require signing secrets

mod jwt;
mod mock;

pub use jwt::JwtTokenValidator;
pub use mock::MockTokenValidator;
