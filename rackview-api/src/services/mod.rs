//! Service Layer
//!
//! Business logic between the HTTP handlers and `InventoryStore`.
//! Handlers extract and respond; services validate and persist.

mod connection_service;
mod device_service;
mod health_probe;
mod rack_service;

pub use connection_service::*;
pub use device_service::*;
pub use health_probe::*;
pub use rack_service::*;
