//! WebSocket upgrade handler for the live update feed.
//!
//! Handles the HTTP → WebSocket upgrade and hands the connection off:
//! 1. Check the `Origin` header against the configured policy
//! 2. Validate the `token` query parameter as an access token
//! 3. Upgrade to WebSocket
//! 4. Register a new client with the hub
//! 5. Spawn the read and write pumps, then return
//!
//! Credential checks happen before the upgrade, so rejected requests never
//! occupy a connection slot.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::adapters::http::ApiResponse;
use crate::config::{ServerConfig, WebSocketConfig};
use crate::domain::foundation::{AuthError, AuthenticatedUser, TokenKind};
use crate::ports::TokenValidator;

use super::client::Client;
use super::hub::HubHandle;
use super::pumps::{spawn_pumps, Keepalive};

/// Which browser origins may open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Any origin, or none at all.
    AllowAny,
    /// Only the listed origins. Requests without an `Origin` header are
    /// accepted only when the list is empty.
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Strict in production, permissive elsewhere.
    pub fn from_config(server: &ServerConfig) -> Self {
        if server.is_production() {
            Self::AllowList(server.allowed_origins())
        } else {
            Self::AllowAny
        }
    }

    pub fn permits(&self, origin: Option<&str>) -> bool {
        match self {
            Self::AllowAny => true,
            Self::AllowList(allowed) => match origin {
                Some(origin) => allowed.iter().any(|a| a == origin),
                None => allowed.is_empty(),
            },
        }
    }
}

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: HubHandle,
    pub validator: Arc<dyn TokenValidator>,
    pub keepalive: Keepalive,
    pub mailbox_capacity: usize,
    pub max_message_size: usize,
    pub origin_policy: OriginPolicy,
}

impl WebSocketState {
    pub fn new(
        hub: HubHandle,
        validator: Arc<dyn TokenValidator>,
        config: &WebSocketConfig,
        origin_policy: OriginPolicy,
    ) -> Self {
        Self {
            hub,
            validator,
            keepalive: Keepalive::from_config(config),
            mailbox_capacity: config.mailbox_capacity,
            max_message_size: config.max_message_size,
            origin_policy,
        }
    }

    /// Replace the keepalive deadlines.
    pub fn with_keepalive(mut self, keepalive: Keepalive) -> Self {
        self.keepalive = keepalive;
        self
    }
}

/// Query string of the upgrade request.
///
/// Browsers cannot attach headers to a WebSocket handshake, so the access
/// token travels as `?token=`.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Routes served by this adapter, relative to the API prefix.
///
/// # Routes
/// - `GET /ws?token=<access token>` - Live update feed
pub fn websocket_router(state: WebSocketState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /api/v1/ws?token=<jwt>`
pub async fn ws_handler(
    State(state): State<WebSocketState>,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());

    if !state.origin_policy.permits(origin) {
        tracing::warn!(origin = ?origin, "Rejected WebSocket origin");
        return reject(StatusCode::FORBIDDEN, "Origin not allowed");
    }

    let token = match params.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return auth_rejection(&AuthError::MissingToken),
    };

    let user = match state.validator.validate(token, TokenKind::Access).await {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected WebSocket credential");
            return auth_rejection(&e);
        }
    };

    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(
                user_id = %user.user_id,
                error = %rejection,
                "WebSocket upgrade rejected"
            );
            return rejection.into_response();
        }
    };

    let max_message_size = state.max_message_size;
    ws.max_message_size(max_message_size)
        .max_frame_size(max_message_size)
        .on_failed_upgrade(|e| {
            tracing::warn!(error = %e, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| start_session(socket, user, state))
}

/// Register a client for an established socket and start its pumps.
async fn start_session(socket: WebSocket, user: AuthenticatedUser, state: WebSocketState) {
    let (client, mailbox) = Client::new(user, state.mailbox_capacity);

    if let Err(e) = state.hub.register(client.clone()).await {
        tracing::error!(client_id = %client.id(), error = %e, "Could not register client");
        client.close();
        return;
    }

    tracing::info!(
        client_id = %client.id(),
        user_id = %client.user_id(),
        role = %client.role(),
        "WebSocket client connected"
    );

    spawn_pumps(socket, client, mailbox, state.hub, state.keepalive);
}

fn auth_rejection(error: &AuthError) -> Response {
    reject(StatusCode::UNAUTHORIZED, &error.to_string())
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, ApiResponse::<()>::error(message)).into_response()
}
