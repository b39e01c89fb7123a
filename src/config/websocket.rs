//! Real-time connection configuration
//!
//! Defaults reproduce the keepalive protocol the frontends were built
//! against: 60s read deadline, pings at 9/10 of it, 10s per-frame write
//! deadline, 512 KiB inbound limit, 256-message mailboxes.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for both keepalive deadlines, in seconds.
pub const MAX_DEADLINE_SECS: u64 = 3600;

/// WebSocket hub and keepalive configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    /// Outbound messages buffered per client before it is evicted
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Depth of the hub's inbound broadcast channel
    #[serde(default = "default_broadcast_buffer")]
    pub broadcast_buffer: usize,

    /// Read deadline in seconds, refreshed by every pong
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,

    /// Per-frame write deadline in seconds
    #[serde(default = "default_write_wait")]
    pub write_wait_secs: u64,

    /// Largest inbound message accepted, in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl WebSocketConfig {
    /// Read deadline as Duration
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    /// Ping interval: 9/10 of the read deadline, so a ping always lands
    /// before the peer's deadline would expire
    pub fn ping_period(&self) -> Duration {
        self.pong_wait() * 9 / 10
    }

    /// Write deadline as Duration
    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_secs)
    }

    /// Validate connection configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 {
            return Err(ValidationError::InvalidMailboxCapacity);
        }
        if self.broadcast_buffer == 0 {
            return Err(ValidationError::InvalidBroadcastBuffer);
        }
        if !(2..=MAX_DEADLINE_SECS).contains(&self.pong_wait_secs) {
            return Err(ValidationError::InvalidPongWait);
        }
        if !(1..=MAX_DEADLINE_SECS).contains(&self.write_wait_secs) {
            return Err(ValidationError::InvalidWriteWait);
        }
        if self.max_message_size == 0 {
            return Err(ValidationError::InvalidMaxMessageSize);
        }
        Ok(())
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            broadcast_buffer: default_broadcast_buffer(),
            pong_wait_secs: default_pong_wait(),
            write_wait_secs: default_write_wait(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    256
}

fn default_broadcast_buffer() -> usize {
    256
}

fn default_pong_wait() -> u64 {
    60
}

fn default_write_wait() -> u64 {
    10
}

fn default_max_message_size() -> usize {
    512 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_config_defaults() {
        let config = WebSocketConfig::default();
        assert_eq!(config.mailbox_capacity, 256);
        assert_eq!(config.pong_wait(), Duration::from_secs(60));
        assert_eq!(config.write_wait(), Duration::from_secs(10));
        assert_eq!(config.max_message_size, 524_288);
    }

    #[test]
    fn test_ping_period_is_nine_tenths_of_pong_wait() {
        let config = WebSocketConfig::default();
        assert_eq!(config.ping_period(), Duration::from_secs(54));

        let config = WebSocketConfig {
            pong_wait_secs: 10,
            ..Default::default()
        };
        assert_eq!(config.ping_period(), Duration::from_secs(9));
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let config = WebSocketConfig {
            mailbox_capacity: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidMailboxCapacity)
        );
    }

    #[test]
    fn test_validation_rejects_tiny_pong_wait() {
        let config = WebSocketConfig {
            pong_wait_secs: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPongWait));
    }

    #[test]
    fn test_validation_rejects_deadlines_past_an_hour() {
        let config = WebSocketConfig {
            pong_wait_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPongWait));

        let config = WebSocketConfig {
            write_wait_secs: MAX_DEADLINE_SECS + 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWriteWait));
    }

    #[test]
    fn test_validation_accepts_deadlines_at_the_cap() {
        let config = WebSocketConfig {
            pong_wait_secs: MAX_DEADLINE_SECS,
            write_wait_secs: MAX_DEADLINE_SECS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.ping_period(), Duration::from_secs(3240));
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(WebSocketConfig::default().validate().is_ok());
    }
}
