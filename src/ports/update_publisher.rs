//! UpdatePublisher port - the sole write path into the broadcast subsystem.
//!
//! CRUD handlers call this after a mutation has been durably committed.
//! Delivery is best-effort and asynchronous relative to the request that
//! triggered it, so the port is infallible from the caller's perspective.

use async_trait::async_trait;

use crate::domain::foundation::BroadcastAction;

/// Port for pushing change notifications to connected clients.
///
/// Implementations must never fail the caller: errors are logged and
/// swallowed, because the CRUD mutation has already succeeded.
///
/// # Example
///
/// ```ignore
/// let payload = serde_json::to_value(&updated_item)?;
/// publisher.publish(payload, BroadcastAction::Update).await;
/// ```
#[async_trait]
pub trait UpdatePublisher: Send + Sync {
    /// Publish `payload` tagged with `action` to every connected client.
    async fn publish(&self, payload: serde_json::Value, action: BroadcastAction);
}
