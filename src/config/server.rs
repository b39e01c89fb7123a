//! Listener, environment and frontend-origin settings
//!
//! Every field has a default, so an empty `server` section is valid.

use serde::Deserialize;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

/// Longest HTTP request timeout accepted, in seconds.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Deployment environment. Production turns on the strict origin check,
/// JSON logs and the secret length rule.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind, as an IP literal
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// Comma-separated frontend origins. Feeds CORS, and in production
    /// the WebSocket origin check.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            environment: Environment::default(),
            log_level: "info,foodcourt_live=debug,tower_http=info".into(),
            request_timeout_secs: 15,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.trim().parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured origins in order, blanks and repeats removed.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        for origin in self.cors_origins.iter().flat_map(|raw| raw.split(',')) {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() && !origins.iter().any(|seen| seen == origin) {
                origins.push(origin.to_owned());
            }
        }
        origins
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}
