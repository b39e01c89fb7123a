//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over `server.log_level`. Production emits JSON lines;
//! every other environment gets the human-readable formatter.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;

pub type TelemetryError = Box<dyn std::error::Error + Send + Sync>;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(server: &ServerConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(&server.log_level);

    if server.is_production() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    }
}

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
