//! WebSocket message types for real-time catalog updates.
//!
//! The connection is output-only: the server never interprets inbound data
//! frames. Every outbound data frame is a JSON text frame shaped as
//!
//! ```json
//! {"type":"item_foodcourt_update","payload":{...},"action":"update"}
//! ```
//!
//! The envelope is serialized once per broadcast and the same bytes are
//! fanned out to every client.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::BroadcastAction;

/// Serialized frame shared by every mailbox it is fanned out to.
pub type OutboundMessage = Arc<str>;

/// Kinds of broadcast the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// An item's listing at a food court was created, changed, or removed.
    ItemFoodcourtUpdate,
}

/// Broadcast envelope: `{type, payload, action}`.
///
/// Field order is part of the wire format and must stay `type`, `payload`,
/// `action`.
#[derive(Debug, Serialize)]
pub struct BroadcastMessage<'a, T: Serialize + ?Sized> {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub payload: &'a T,
    pub action: BroadcastAction,
}

impl<'a, T: Serialize + ?Sized> BroadcastMessage<'a, T> {
    /// Envelope for an item/food-court listing change.
    pub fn item_foodcourt_update(payload: &'a T, action: BroadcastAction) -> Self {
        Self {
            kind: MessageKind::ItemFoodcourtUpdate,
            payload,
            action,
        }
    }

    /// Serialize into the frame that is placed in client mailboxes.
    pub fn to_frame(&self) -> Result<OutboundMessage, serde_json::Error> {
        serde_json::to_string(self).map(OutboundMessage::from)
    }
}
