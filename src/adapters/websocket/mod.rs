//! WebSocket adapters for the real-time catalog feed.
//!
//! Pushes committed catalog changes to every connected frontend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    CRUD handlers (after commit)                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ publish(payload, action)
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      BroadcastPublisher                              │
//! │   - Wraps payload in {type, payload, action}                        │
//! │   - Serializes once                                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ broadcast
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            Hub                                       │
//! │   register / unregister / broadcast, one loop, one registry         │
//! │   ├── client-a mailbox ──► write pump ──► socket                     │
//! │   ├── client-b mailbox ──► write pump ──► socket                     │
//! │   └── client-c mailbox ──► write pump ──► socket                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - Wire envelope
//! - [`client`] - Per-connection mailbox with a one-shot close
//! - [`hub`] - Registry and fan-out loop
//! - [`pumps`] - Read/write pumps and keepalive
//! - [`handler`] - Axum WebSocket upgrade handler
//! - [`publisher`] - Entry point for CRUD handlers

pub mod client;
pub mod handler;
pub mod hub;
pub mod messages;
pub mod publisher;
pub mod pumps;

pub use client::{Client, EnqueueError, Mailbox, DEFAULT_MAILBOX_CAPACITY};
pub use handler::{websocket_router, ws_handler, ConnectParams, OriginPolicy, WebSocketState};
pub use hub::{Hub, HubError, HubHandle, DEFAULT_BROADCAST_BUFFER};
pub use messages::{BroadcastMessage, MessageKind, OutboundMessage};
pub use publisher::BroadcastPublisher;
pub use pumps::{spawn_pumps, Keepalive, TransportError};
