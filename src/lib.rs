//! Foodcourt Live - real-time catalog broadcast for the food-court platform
//!
//! Authenticated frontends hold a WebSocket open; whenever the CRUD layer
//! commits a change to an item's listing at a food court, every connected
//! client receives it.

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
