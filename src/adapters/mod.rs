//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the broadcast core to the outside world:
//! - `auth` - Credential validation (JWT, mock)
//! - `http` - Router, health endpoint, JSON envelope
//! - `websocket` - Hub, connection handler, pumps, publisher

pub mod auth;
pub mod http;
pub mod websocket;
