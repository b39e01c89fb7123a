//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the broadcast core and its collaborators. Adapters implement these ports.
//!
//! - `TokenValidator` - Verifies bearer credentials before a handshake
//! - `UpdatePublisher` - Entry point CRUD handlers use to announce changes

mod token_validator;
mod update_publisher;

pub use token_validator::TokenValidator;
pub use update_publisher::UpdatePublisher;
