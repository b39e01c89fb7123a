//! Food-court catalog entities carried by real-time broadcasts.
//!
//! The catalog is owned by the document store and mutated by the CRUD layer;
//! this crate only needs the wire shape of the per-food-court item listing so
//! it can be pushed to connected clients after a change commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Availability of an item at one food court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    NotAvailable,
    SellingFast,
    FinishingSoon,
}

/// Meal slot an item is offered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

/// An item as listed at a specific food court.
///
/// Field names match what the frontends already consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFoodCourt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub item_id: String,
    pub foodcourt_id: String,
    pub status: ItemStatus,
    /// Location-specific price override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "timeSlot")]
    pub time_slot: TimeSlot,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
