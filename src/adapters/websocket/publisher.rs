//! Broadcast publisher - entry point for CRUD handlers.
//!
//! Builds the wire envelope, serializes it once, and hands it to the hub.
//! Publishing is best-effort: nothing here ever fails the caller, because
//! the mutation that triggered the broadcast has already been committed.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::catalog::ItemFoodCourt;
use crate::domain::foundation::BroadcastAction;
use crate::ports::UpdatePublisher;

use super::hub::HubHandle;
use super::messages::BroadcastMessage;

/// Pushes change notifications onto the hub.
///
/// Constructed once by the composition root and shared by every handler
/// that mutates catalog data.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    hub: Option<HubHandle>,
}

impl BroadcastPublisher {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub: Some(hub) }
    }

    /// A publisher with no hub behind it. Every publish is a logged no-op.
    pub fn disconnected() -> Self {
        Self { hub: None }
    }

    /// Broadcast any serializable entity as an `item_foodcourt_update`.
    pub async fn publish_update<T>(&self, payload: &T, action: BroadcastAction)
    where
        T: Serialize + Sync + ?Sized,
    {
        let Some(hub) = &self.hub else {
            tracing::warn!(action = %action, "Hub not initialized, dropping broadcast");
            return;
        };

        let frame = match BroadcastMessage::item_foodcourt_update(payload, action).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(action = %action, error = %e, "Failed to serialize broadcast");
                return;
            }
        };

        if let Err(e) = hub.broadcast(frame).await {
            tracing::warn!(action = %action, error = %e, "Dropping broadcast");
        }
    }

    /// Broadcast a change to an item's listing at a food court.
    pub async fn publish_item_foodcourt(&self, item: &ItemFoodCourt, action: BroadcastAction) {
        self.publish_update(item, action).await
    }
}

#[async_trait]
impl UpdatePublisher for BroadcastPublisher {
    async fn publish(&self, payload: serde_json::Value, action: BroadcastAction) {
        self.publish_update(&payload, action).await
    }
}
