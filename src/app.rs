//! Composition root for the real-time subsystem.
//!
//! Builds the hub once and hands the same handle to the connection handler,
//! the publisher and the health endpoint. The embedding service mounts
//! [`Realtime::router`] and gives [`Realtime::update_publisher`] to its CRUD
//! handlers.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::adapters::http::app_router;
use crate::adapters::websocket::{
    BroadcastPublisher, Hub, HubHandle, Keepalive, OriginPolicy, WebSocketState,
};
use crate::config::AppConfig;
use crate::ports::{TokenValidator, UpdatePublisher};

/// The assembled real-time subsystem: one running hub, the publisher
/// bound to it, and the router that serves `/api/v1/ws` and `/health`.
///
/// Dropping it without calling [`Realtime::serve`] leaves the hub running
/// for as long as a [`HubHandle`] clone is alive.
pub struct Realtime {
    pub hub: HubHandle,
    pub publisher: BroadcastPublisher,
    pub router: Router,
    hub_task: JoinHandle<()>,
}

impl Realtime {
    /// Spawn the hub and wire every component to it. Must be called inside
    /// a Tokio runtime.
    pub fn build(config: &AppConfig, validator: Arc<dyn TokenValidator>) -> Self {
        Self::build_with_keepalive(config, validator, Keepalive::from_config(&config.websocket))
    }

    /// As [`Realtime::build`], with explicit keepalive deadlines.
    pub fn build_with_keepalive(
        config: &AppConfig,
        validator: Arc<dyn TokenValidator>,
        keepalive: Keepalive,
    ) -> Self {
        let (hub, hub_task) = Hub::spawn(config.websocket.broadcast_buffer);

        let ws_state = WebSocketState::new(
            hub.clone(),
            validator,
            &config.websocket,
            OriginPolicy::from_config(&config.server),
        )
        .with_keepalive(keepalive);

        Self {
            publisher: BroadcastPublisher::new(hub.clone()),
            router: app_router(&config.server, ws_state),
            hub,
            hub_task,
        }
    }

    /// Publisher as the port CRUD handlers depend on.
    pub fn update_publisher(&self) -> Arc<dyn UpdatePublisher> {
        Arc::new(self.publisher.clone())
    }

    /// Serve until `shutdown` resolves, then stop the hub.
    ///
    /// Broadcasts accepted before the stop are still delivered. Every live
    /// client is closed, so its write pump sends a close frame and exits.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            hub,
            publisher,
            router,
            hub_task,
        } = self;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        let connected = hub.connected_count().await;
        tracing::info!(connected, "HTTP server stopped, closing live connections");

        hub.shutdown();
        drop(publisher);
        drop(hub);
        if let Err(e) = hub_task.await {
            tracing::error!(error = %e, "Hub task failed");
        }
        Ok(())
    }
}
