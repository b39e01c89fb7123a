//! Liveness endpoint.

use axum::{extract::State, routing::get, Router};
use serde::Serialize;

use crate::adapters::websocket::HubHandle;

use super::response::ApiResponse;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub websocket_clients: usize,
    pub status: &'static str,
}

/// # Routes
/// - `GET /health` - Liveness plus the number of connected WebSocket clients
pub fn health_router(hub: HubHandle) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(hub)
}

pub async fn health_handler(State(hub): State<HubHandle>) -> ApiResponse<HealthData> {
    ApiResponse::success(
        "Server is running",
        HealthData {
            websocket_clients: hub.connected_count().await,
            status: "healthy",
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::{Client, Hub};
    use crate::domain::foundation::{AuthenticatedUser, Role, UserId};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    async fn get_health(router: Router) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_zero_clients() {
        let (hub, _task) = Hub::spawn(16);

        let (status, body) = get_health(health_router(hub)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Server is running",
                "data": {"websocket_clients": 0, "status": "healthy"}
            })
        );
    }

    #[tokio::test]
    async fn health_counts_registered_clients() {
        let (hub, _task) = Hub::spawn(16);
        let user = AuthenticatedUser::new(UserId::new("u1").unwrap(), Role::Manager);
        let (client, _mailbox) = Client::new(user, 4);
        hub.register(client).await.unwrap();

        let (_, body) = get_health(health_router(hub)).await;

        assert_eq!(body["data"]["websocket_clients"], 1);
    }
}
