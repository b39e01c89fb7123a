//! Process-wide registry and fan-out loop for live connections.
//!
//! # Architecture
//!
//! ```text
//!   ws handler ──register──┐
//!   pumps ───────unregister┼──► Hub::run (single task) ──enqueue──► Client mailboxes
//!   publisher ──broadcast──┘          │
//!                                     └── Registry (RwLock) ◄── connected_count()
//! ```
//!
//! All registry mutation happens inside [`Hub::run`]. The lock around the
//! registry exists only so that [`HubHandle::connected_count`] can be read
//! from outside the loop.
//!
//! A client whose mailbox is full during fan-out is not removed in place;
//! it is queued on the unregister channel and removed on the next loop
//! iteration, through the same path the pumps use.
//!
//! The loop ends on [`HubHandle::shutdown`] or when every handle is gone.
//! Either way, broadcasts already accepted are fanned out before every
//! remaining mailbox is closed.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;

use crate::domain::foundation::ClientId;

use super::client::{Client, EnqueueError};
use super::messages::OutboundMessage;

/// Default depth of the broadcast queue feeding the hub loop.
pub const DEFAULT_BROADCAST_BUFFER: usize = 256;

/// Errors surfaced to callers of [`HubHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// The hub loop is no longer running.
    #[error("hub is not running")]
    Stopped,
}

struct Registration {
    client: Arc<Client>,
    ack: oneshot::Sender<()>,
}

#[derive(Default)]
struct Registry {
    clients: RwLock<HashMap<ClientId, Arc<Client>>>,
}

/// The hub loop. Construct with [`Hub::new`], then drive with [`Hub::run`]
/// (or use [`Hub::spawn`]).
pub struct Hub {
    registry: Arc<Registry>,
    register_rx: mpsc::UnboundedReceiver<Registration>,
    unregister_rx: mpsc::UnboundedReceiver<Arc<Client>>,
    broadcast_rx: mpsc::Receiver<OutboundMessage>,
    stop_rx: mpsc::UnboundedReceiver<()>,
    /// Evictions are fed back through the public unregister queue.
    evict_tx: mpsc::UnboundedSender<Arc<Client>>,
}

/// Cloneable handle used to talk to a running hub.
#[derive(Clone)]
pub struct HubHandle {
    registry: Arc<Registry>,
    register_tx: mpsc::UnboundedSender<Registration>,
    unregister_tx: mpsc::UnboundedSender<Arc<Client>>,
    broadcast_tx: mpsc::Sender<OutboundMessage>,
    stop_tx: mpsc::UnboundedSender<()>,
}

impl std::fmt::Debug for HubHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandle")
            .field("running", &!self.broadcast_tx.is_closed())
            .finish()
    }
}

impl Hub {
    /// Create a hub and its first handle.
    ///
    /// `broadcast_buffer` bounds how many serialized messages may wait for
    /// the loop before publishers start waiting.
    pub fn new(broadcast_buffer: usize) -> (Self, HubHandle) {
        let registry = Arc::new(Registry::default());
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(broadcast_buffer.max(1));
        let (stop_tx, stop_rx) = mpsc::unbounded_channel();

        let hub = Self {
            registry: registry.clone(),
            register_rx,
            unregister_rx,
            broadcast_rx,
            stop_rx,
            evict_tx: unregister_tx.clone(),
        };
        let handle = HubHandle {
            registry,
            register_tx,
            unregister_tx,
            broadcast_tx,
            stop_tx,
        };

        (hub, handle)
    }

    /// Create a hub and run its loop on a background task.
    pub fn spawn(broadcast_buffer: usize) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(broadcast_buffer);
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Run the loop until [`HubHandle::shutdown`] is called or every
    /// [`HubHandle`] has been dropped.
    ///
    /// Registrations are served first, then unregistrations, then
    /// broadcasts, so a queued eviction always lands before the next
    /// fan-out. On exit every remaining client is closed.
    pub async fn run(mut self) {
        tracing::info!("Hub loop started");

        loop {
            tokio::select! {
                biased;

                Some(()) = self.stop_rx.recv() => {
                    self.drain_broadcasts().await;
                    break;
                }

                // A closed register queue only disables this arm; the loop
                // ends once the broadcast queue is drained.
                Some(registration) = self.register_rx.recv() => {
                    self.register(registration).await;
                }

                Some(client) = self.unregister_rx.recv() => {
                    self.unregister(client).await;
                }

                message = self.broadcast_rx.recv() => match message {
                    Some(message) => self.broadcast(message).await,
                    None => break,
                },
            }
        }

        self.shutdown().await;
    }

    async fn register(&self, registration: Registration) {
        let Registration { client, ack } = registration;
        let count = {
            let mut clients = self.registry.clients.write().await;
            clients.insert(client.id(), client.clone());
            clients.len()
        };

        tracing::debug!(
            client_id = %client.id(),
            user_id = %client.user_id(),
            role = %client.role(),
            connected = count,
            "Client registered"
        );

        // The registering side may have given up; the client stays
        // registered and its pumps will unregister it.
        let _ = ack.send(());
    }

    async fn unregister(&self, client: Arc<Client>) {
        let mut clients = self.registry.clients.write().await;

        if clients.remove(&client.id()).is_some() {
            client.close();
            tracing::debug!(
                client_id = %client.id(),
                user_id = %client.user_id(),
                connected = clients.len(),
                "Client unregistered"
            );
        }
    }

    async fn broadcast(&self, message: OutboundMessage) {
        let clients = self.registry.clients.read().await;

        for client in clients.values() {
            match client.enqueue(message.clone()) {
                Ok(()) => {}
                Err(EnqueueError::Full) => {
                    tracing::warn!(
                        client_id = %client.id(),
                        user_id = %client.user_id(),
                        "Client mailbox full, evicting"
                    );
                    // The receiver lives in `self`, so this cannot fail.
                    let _ = self.evict_tx.send(client.clone());
                }
                Err(EnqueueError::Closed) => {
                    tracing::debug!(
                        client_id = %client.id(),
                        "Write pump gone, evicting"
                    );
                    let _ = self.evict_tx.send(client.clone());
                }
            }
        }
    }

    async fn drain_broadcasts(&mut self) {
        while let Ok(message) = self.broadcast_rx.try_recv() {
            self.broadcast(message).await;
        }
    }

    async fn shutdown(&self) {
        let mut clients = self.registry.clients.write().await;
        let remaining = clients.len();
        for (_, client) in clients.drain() {
            client.close();
        }
        tracing::info!(closed = remaining, "Hub loop stopped");
    }
}

impl HubHandle {
    /// Add a client to the registry.
    ///
    /// Resolves once the hub has recorded it, so the connected count
    /// already includes it when this returns.
    pub async fn register(&self, client: Arc<Client>) -> Result<(), HubError> {
        let (ack, acked) = oneshot::channel();
        self.register_tx
            .send(Registration { client, ack })
            .map_err(|_| HubError::Stopped)?;
        acked.await.map_err(|_| HubError::Stopped)
    }

    /// Remove a client and close its mailbox. Safe to call more than once
    /// and from either pump.
    ///
    /// Never waits. If the hub has already stopped the client is closed
    /// directly.
    pub fn unregister(&self, client: Arc<Client>) {
        if let Err(mpsc::error::SendError(client)) = self.unregister_tx.send(client) {
            client.close();
        }
    }

    /// Queue a serialized message for delivery to every registered client.
    pub async fn broadcast(&self, message: OutboundMessage) -> Result<(), HubError> {
        self.broadcast_tx
            .send(message)
            .await
            .map_err(|_| HubError::Stopped)
    }

    /// Number of currently registered clients.
    pub async fn connected_count(&self) -> usize {
        self.registry.clients.read().await.len()
    }

    /// Ask the loop to stop. Broadcasts already queued are still delivered,
    /// then every client is closed. Handles held elsewhere see
    /// [`HubError::Stopped`] afterwards.
    pub fn shutdown(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Whether the hub loop is still accepting work.
    pub fn is_running(&self) -> bool {
        !self.broadcast_tx.is_closed()
    }
}
