//! HTTP adapters - routing, health, and the response envelope.

pub mod health;
pub mod response;
pub mod router;

pub use health::{health_handler, health_router, HealthData};
pub use response::ApiResponse;
pub use router::app_router;
