//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration (HS256 platform tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens
    pub access_secret: SecretString,

    /// Secret used to sign refresh tokens
    pub refresh_secret: SecretString,

    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_secs: u64,
}

impl AuthConfig {
    /// Get access token lifetime as Duration
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    /// Get refresh token lifetime as Duration
    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    /// Validate authentication configuration
    ///
    /// Secrets are always required. In production they must also be long
    /// enough to resist brute force.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let access = self.access_secret.expose_secret();
        let refresh = self.refresh_secret.expose_secret();

        if access.is_empty() {
            return Err(ValidationError::MissingRequired("ACCESS_SECRET"));
        }
        if refresh.is_empty() {
            return Err(ValidationError::MissingRequired("REFRESH_SECRET"));
        }
        if access == refresh {
            return Err(ValidationError::SecretsMustDiffer);
        }

        if *environment == Environment::Production {
            if access.len() < MIN_PRODUCTION_SECRET_LEN {
                return Err(ValidationError::SecretTooShort("ACCESS_SECRET"));
            }
            if refresh.len() < MIN_PRODUCTION_SECRET_LEN {
                return Err(ValidationError::SecretTooShort("REFRESH_SECRET"));
            }
        }

        if self.access_token_ttl_secs == 0 {
            return Err(ValidationError::InvalidTokenTtl("ACCESS_TOKEN_TTL_SECS"));
        }
        if self.refresh_token_ttl_secs == 0 {
            return Err(ValidationError::InvalidTokenTtl("REFRESH_TOKEN_TTL_SECS"));
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: SecretString::new(String::new()),
            refresh_secret: SecretString::new(String::new()),
            access_token_ttl_secs: default_access_token_ttl(),
            refresh_token_ttl_secs: default_refresh_token_ttl(),
        }
    }
}

fn default_access_token_ttl() -> u64 {
    15 * 60
}

fn default_refresh_token_ttl() -> u64 {
    7 * 24 * 60 * 60
}
