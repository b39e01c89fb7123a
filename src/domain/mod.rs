//! Domain layer containing domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, auth types, errors)
//! - `catalog` - Food-court item listings carried by broadcasts

pub mod catalog;
pub mod foundation;
