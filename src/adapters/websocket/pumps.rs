//! Read and write pumps for one connection.
//!
//! Each live connection runs two independent tasks:
//!
//! - the **read pump** enforces the read deadline. Only pongs refresh it;
//!   inbound data frames are discarded.
//! - the **write pump** drains the client's mailbox onto the wire and sends
//!   a ping every `ping_period`.
//!
//! Whichever pump stops first unregisters the client. Unregistering closes
//! the mailbox, which stops the write pump, and closing the client stops
//! the read pump, so both tasks always wind down through the same path.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::WebSocketConfig;

use super::client::{Client, Mailbox};
use super::hub::HubHandle;

/// Deadlines governing the keepalive protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keepalive {
    /// How long the read side waits for a pong before giving up.
    pub pong_wait: Duration,
    /// Interval between pings; shorter than `pong_wait`.
    pub ping_period: Duration,
    /// Deadline for writing a single frame.
    pub write_wait: Duration,
}

impl Keepalive {
    pub fn from_config(config: &WebSocketConfig) -> Self {
        Self {
            pong_wait: config.pong_wait(),
            ping_period: config.ping_period(),
            write_wait: config.write_wait(),
        }
    }

    /// Keepalive with pings at 9/10 of `pong_wait`.
    pub fn with_pong_wait(pong_wait: Duration, write_wait: Duration) -> Self {
        Self {
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            write_wait,
        }
    }
}

impl Default for Keepalive {
    fn default() -> Self {
        Self::from_config(&WebSocketConfig::default())
    }
}

/// Failure writing a frame to the peer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write deadline exceeded")]
    WriteTimeout,

    #[error("socket error: {0}")]
    Socket(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Outbound half of a connection, shared by both pumps.
pub type SharedSink<S> = Arc<Mutex<S>>;

/// Split `socket` and start both pumps for `client`.
///
/// Returns immediately; the pumps run on their own tasks.
pub fn spawn_pumps<W, E>(
    socket: W,
    client: Arc<Client>,
    mailbox: Mailbox,
    hub: HubHandle,
    keepalive: Keepalive,
) where
    W: Stream<Item = Result<Message, E>> + Sink<Message> + Send + 'static,
    <W as Sink<Message>>::Error: std::error::Error + Send + Sync + 'static,
    E: Display + Send + 'static,
{
    let (sink, stream) = socket.split();
    let sink = Arc::new(Mutex::new(sink));

    tokio::spawn(write_pump(
        client.clone(),
        hub.clone(),
        mailbox,
        sink.clone(),
        keepalive,
    ));
    tokio::spawn(read_pump(client, hub, stream, sink, keepalive));
}

/// Consume inbound frames until the peer goes quiet, errors, or the client
/// is closed elsewhere.
pub async fn read_pump<R, S, E>(
    client: Arc<Client>,
    hub: HubHandle,
    mut stream: R,
    sink: SharedSink<S>,
    keepalive: Keepalive,
) where
    R: Stream<Item = Result<Message, E>> + Unpin,
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
    E: Display,
{
    let mut deadline = Instant::now() + keepalive.pong_wait;

    let reason = loop {
        tokio::select! {
            _ = client.closed() => break "client closed",

            frame = time::timeout_at(deadline, stream.next()) => match frame {
                Err(_) => break "read deadline expired",
                Ok(None) => break "stream ended",
                Ok(Some(Err(e))) => {
                    tracing::debug!(client_id = %client.id(), error = %e, "Read error");
                    break "read error";
                }
                Ok(Some(Ok(Message::Pong(_)))) => {
                    deadline = Instant::now() + keepalive.pong_wait;
                }
                Ok(Some(Ok(Message::Close(_)))) => break "peer closed",
                // Inbound data and pings carry nothing for us.
                Ok(Some(Ok(_))) => {}
            },
        }
    };

    tracing::debug!(client_id = %client.id(), reason, "Read pump stopped");

    hub.unregister(client);
    close_connection(&sink, keepalive.write_wait).await;
}

/// Deliver mailbox messages and periodic pings until the mailbox closes or
/// a write fails.
pub async fn write_pump<S>(
    client: Arc<Client>,
    hub: HubHandle,
    mut mailbox: Mailbox,
    sink: SharedSink<S>,
    keepalive: Keepalive,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut ticker = time::interval_at(
        Instant::now() + keepalive.ping_period,
        keepalive.ping_period,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        tokio::select! {
            message = mailbox.recv() => match message {
                Some(text) => {
                    let frame = Message::Text(text.to_string());
                    if let Err(e) = write_frame(&sink, frame, keepalive.write_wait).await {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            },

            _ = ticker.tick() => {
                if let Err(e) = write_frame(&sink, Message::Ping(Vec::new()), keepalive.write_wait).await {
                    break Err(e);
                }
            }
        }
    };

    match result {
        Ok(()) => tracing::debug!(client_id = %client.id(), "Mailbox closed, write pump stopped"),
        Err(e) => tracing::debug!(client_id = %client.id(), error = %e, "Write pump stopped"),
    }

    hub.unregister(client);
    close_connection(&sink, keepalive.write_wait).await;
}

async fn write_frame<S>(
    sink: &SharedSink<S>,
    frame: Message,
    write_wait: Duration,
) -> Result<(), TransportError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let write = async {
        let mut sink = sink.lock().await;
        sink.send(frame).await
    };

    match time::timeout(write_wait, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(TransportError::Socket(Box::new(e))),
        Err(_) => Err(TransportError::WriteTimeout),
    }
}

/// Best-effort close frame followed by closing the sink. Errors are
/// expected when the other pump got there first.
async fn close_connection<S>(sink: &SharedSink<S>, write_wait: Duration)
where
    S: Sink<Message> + Unpin,
{
    let close = async {
        let mut sink = sink.lock().await;
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    };

    let _ = time::timeout(write_wait, close).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::hub::Hub;
    use crate::adapters::websocket::messages::OutboundMessage;
    use crate::domain::foundation::{AuthenticatedUser, Role, UserId};
    use futures::channel::mpsc as fmpsc;

    type Inbound = fmpsc::UnboundedSender<Result<Message, axum::Error>>;
    type Outbound = fmpsc::UnboundedReceiver<Message>;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("user-123").unwrap(), Role::Vendor)
    }

    fn fast_keepalive() -> Keepalive {
        Keepalive::with_pong_wait(Duration::from_millis(300), Duration::from_millis(200))
    }

    struct Harness {
        hub: HubHandle,
        client: Arc<Client>,
        inbound: Inbound,
        outbound: Outbound,
    }

    /// Registers a client and starts both pumps over in-memory channels.
    async fn start(keepalive: Keepalive) -> Harness {
        let (hub, _task) = Hub::spawn(16);
        let (client, mailbox) = Client::new(test_user(), 8);
        hub.register(client.clone()).await.unwrap();

        let (inbound, stream) = fmpsc::unbounded();
        let (sink, outbound) = fmpsc::unbounded();
        let sink = Arc::new(Mutex::new(sink));

        tokio::spawn(write_pump(
            client.clone(),
            hub.clone(),
            mailbox,
            sink.clone(),
            keepalive,
        ));
        tokio::spawn(read_pump(client.clone(), hub.clone(), stream, sink, keepalive));

        Harness {
            hub,
            client,
            inbound,
            outbound,
        }
    }

    async fn next_non_ping(outbound: &mut Outbound) -> Option<Message> {
        loop {
            match outbound.next().await {
                Some(Message::Ping(_)) => continue,
                other => return other,
            }
        }
    }

    async fn wait_closed(client: &Client, within: Duration) {
        time::timeout(within, client.closed())
            .await
            .expect("client should have been closed");
    }

    #[test]
    fn keepalive_defaults_match_protocol() {
        let keepalive = Keepalive::default();
        assert_eq!(keepalive.pong_wait, Duration::from_secs(60));
        assert_eq!(keepalive.ping_period, Duration::from_secs(54));
        assert_eq!(keepalive.write_wait, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn write_pump_delivers_mailbox_as_text_frames_in_order() {
        let mut h = start(Keepalive::default()).await;

        h.hub.broadcast(OutboundMessage::from("one")).await.unwrap();
        h.hub.broadcast(OutboundMessage::from("two")).await.unwrap();

        assert_eq!(
            next_non_ping(&mut h.outbound).await,
            Some(Message::Text("one".into()))
        );
        assert_eq!(
            next_non_ping(&mut h.outbound).await,
            Some(Message::Text("two".into()))
        );
    }

    #[tokio::test]
    async fn write_pump_sends_pings() {
        let mut h = start(fast_keepalive()).await;

        let first = time::timeout(Duration::from_secs(1), h.outbound.next())
            .await
            .unwrap();
        assert!(matches!(first, Some(Message::Ping(_))));
    }

    #[tokio::test]
    async fn silent_peer_is_evicted_after_pong_wait() {
        let h = start(fast_keepalive()).await;
        assert_eq!(h.hub.connected_count().await, 1);

        wait_closed(&h.client, Duration::from_secs(2)).await;
        assert_eq!(h.hub.connected_count().await, 0);
        drop(h.inbound);
    }

    #[tokio::test]
    async fn pongs_keep_the_connection_alive() {
        let h = start(fast_keepalive()).await;

        for _ in 0..6 {
            time::sleep(Duration::from_millis(100)).await;
            h.inbound.unbounded_send(Ok(Message::Pong(Vec::new()))).unwrap();
        }

        // 600ms elapsed, twice the read deadline.
        assert!(!h.client.is_closed());
        assert_eq!(h.hub.connected_count().await, 1);
    }

    #[tokio::test]
    async fn inbound_data_does_not_refresh_deadline() {
        let h = start(fast_keepalive()).await;

        for _ in 0..6 {
            time::sleep(Duration::from_millis(100)).await;
            let _ = h
                .inbound
                .unbounded_send(Ok(Message::Text("hello".into())));
        }

        assert!(h.client.is_closed());
    }

    #[tokio::test]
    async fn read_error_tears_down_connection() {
        let mut h = start(Keepalive::default()).await;

        h.inbound
            .unbounded_send(Err(axum::Error::new("connection reset")))
            .unwrap();

        wait_closed(&h.client, Duration::from_secs(1)).await;
        assert_eq!(
            next_non_ping(&mut h.outbound).await,
            Some(Message::Close(None))
        );
    }

    #[tokio::test]
    async fn peer_close_frame_tears_down_connection() {
        let h = start(Keepalive::default()).await;

        h.inbound.unbounded_send(Ok(Message::Close(None))).unwrap();

        wait_closed(&h.client, Duration::from_secs(1)).await;
        assert_eq!(h.hub.connected_count().await, 0);
    }

    #[tokio::test]
    async fn eviction_stops_both_pumps_with_close_frame() {
        let mut h = start(Keepalive::default()).await;

        h.hub.unregister(h.client.clone());

        assert_eq!(
            next_non_ping(&mut h.outbound).await,
            Some(Message::Close(None))
        );
        // Sink closed by teardown; no further frames.
        assert_eq!(next_non_ping(&mut h.outbound).await, None);
    }

    #[tokio::test]
    async fn write_failure_unregisters_client() {
        let h = start(Keepalive::default()).await;
        drop(h.outbound);

        h.hub.broadcast(OutboundMessage::from("lost")).await.unwrap();

        wait_closed(&h.client, Duration::from_secs(1)).await;
        assert_eq!(h.hub.connected_count().await, 0);
    }
}
