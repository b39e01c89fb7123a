//! Typed configuration read from `FOODCOURT_LIVE__*` environment variables.
//!
//! Sections nest with `__`: `FOODCOURT_LIVE__SERVER__PORT=3000` sets
//! `server.port`. A `.env` file in the working directory is read first when
//! present. Only the two token secrets are required; `server` and
//! `websocket` fall back to their defaults.
//!
//! ```no_run
//! use foodcourt_live::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod auth;
mod error;
mod server;
mod websocket;

pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig, MAX_REQUEST_TIMEOUT_SECS};
pub use websocket::{WebSocketConfig, MAX_DEADLINE_SECS};

use serde::Deserialize;

const ENV_PREFIX: &str = "FOODCOURT_LIVE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl AppConfig {
    /// Read `.env` if present, then the process environment.
    ///
    /// Fails with [`ConfigError::LoadError`] when a secret is missing or a
    /// value does not parse. Range checks are left to [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::DotEnv(e));
            }
        }
        Self::from_source(env_source())
    }

    fn from_source(source: config::Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Check every section. The auth rules depend on the environment.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.websocket.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Load from a fixed variable set instead of the process environment.
    fn load_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_source(env_source().source(Some(map)))
    }

    const SECRETS: [(&str, &str); 2] = [
        ("FOODCOURT_LIVE__AUTH__ACCESS_SECRET", "access-secret"),
        ("FOODCOURT_LIVE__AUTH__REFRESH_SECRET", "refresh-secret"),
    ];

    fn with_secrets(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        SECRETS.iter().chain(extra).copied().collect()
    }

    #[test]
    fn secrets_alone_give_a_valid_development_config() {
        let config = load_from(&SECRETS).unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(!config.is_production());
        assert_eq!(config.websocket.mailbox_capacity, 256);
        assert_eq!(config.websocket.pong_wait_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_secret_is_a_load_error() {
        let result = load_from(&[("FOODCOURT_LIVE__AUTH__ACCESS_SECRET", "only-one")]);
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn unprefixed_variables_are_ignored() {
        let result = load_from(&[
            ("AUTH__ACCESS_SECRET", "a"),
            ("AUTH__REFRESH_SECRET", "b"),
        ]);
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn nested_overrides_are_parsed() {
        let config = load_from(&with_secrets(&[
            ("FOODCOURT_LIVE__SERVER__PORT", "3000"),
            ("FOODCOURT_LIVE__SERVER__CORS_ORIGINS", "https://a.example.com,https://b.example.com"),
            ("FOODCOURT_LIVE__WEBSOCKET__MAILBOX_CAPACITY", "64"),
            ("FOODCOURT_LIVE__WEBSOCKET__PONG_WAIT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.allowed_origins().len(), 2);
        assert_eq!(config.websocket.mailbox_capacity, 64);
        assert_eq!(config.websocket.ping_period().as_secs(), 27);
    }

    #[test]
    fn unparseable_number_is_a_load_error() {
        let result = load_from(&with_secrets(&[("FOODCOURT_LIVE__SERVER__PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn out_of_range_values_load_but_fail_validation() {
        let config = load_from(&with_secrets(&[(
            "FOODCOURT_LIVE__WEBSOCKET__PONG_WAIT_SECS",
            "86400",
        )]))
        .unwrap();

        assert_eq!(config.validate(), Err(ValidationError::InvalidPongWait));
    }

    #[test]
    fn production_requires_long_secrets() {
        let config = load_from(&with_secrets(&[(
            "FOODCOURT_LIVE__SERVER__ENVIRONMENT",
            "production",
        )]))
        .unwrap();

        assert!(config.is_production());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::SecretTooShort(_))
        ));
    }
}
