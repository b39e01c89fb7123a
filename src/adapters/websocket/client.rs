//! Server-side handle for one connected peer.
//!
//! A `Client` owns the sending half of a bounded mailbox; the receiving half
//! is handed to the connection's write pump. The hub is the only producer
//! and the write pump the only consumer.
//!
//! Closing drops the sending half, so the write pump drains what is already
//! buffered and then observes the end of the mailbox. The close guard makes
//! this happen exactly once no matter how many teardown paths race to it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::domain::foundation::{AuthenticatedUser, ClientId, Role, UserId};

use super::messages::OutboundMessage;

/// Default number of messages a client may have in flight.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Receiving half of a client's mailbox, drained by the write pump.
pub type Mailbox = mpsc::Receiver<OutboundMessage>;

/// Why a message could not be placed in a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    /// The consumer is not keeping up; the caller must evict, not wait.
    #[error("mailbox full")]
    Full,

    /// The client has already been closed.
    #[error("mailbox closed")]
    Closed,
}

/// One live connection as seen by the hub.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    user: AuthenticatedUser,
    /// `None` once closed; taking it is the one-shot close guard.
    sender: Mutex<Option<mpsc::Sender<OutboundMessage>>>,
    closed: watch::Sender<bool>,
    rejected_after_close: AtomicUsize,
}

impl Client {
    /// Create a client with a fresh id and an empty mailbox of `capacity`.
    ///
    /// Returns the shared handle (owned by the hub registry, borrowed by
    /// the pumps) and the mailbox receiver for the write pump.
    pub fn new(user: AuthenticatedUser, capacity: usize) -> (Arc<Self>, Mailbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (closed, _) = watch::channel(false);

        let client = Arc::new(Self {
            id: ClientId::new(),
            user,
            sender: Mutex::new(Some(tx)),
            closed,
            rejected_after_close: AtomicUsize::new(0),
        });

        (client, rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.user_id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Place a message in the mailbox without waiting.
    pub fn enqueue(&self, message: OutboundMessage) -> Result<(), EnqueueError> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(tx) = sender.as_ref() else {
            self.rejected_after_close.fetch_add(1, Ordering::Relaxed);
            return Err(EnqueueError::Closed);
        };

        tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
            mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
        })
    }

    /// Close the mailbox. Idempotent; returns `true` only for the call that
    /// actually closed it.
    pub fn close(&self) -> bool {
        let taken = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match taken {
            Some(_) => {
                self.closed.send_replace(true);
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the client has been closed.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives as long as `self`, so this only ends on close.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    /// Number of enqueue attempts made after the mailbox was closed.
    pub fn rejected_after_close(&self) -> usize {
        self.rejected_after_close.load(Ordering::Relaxed)
    }
}
