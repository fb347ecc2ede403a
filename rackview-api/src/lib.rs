//! RackView API - REST Layer
//!
//! Axum server for the rack inventory: racks, the devices mounted in them,
//! and the network connections between devices. Device writes are checked
//! against the rack geometry by `rackview_storage::validate_placement`.
//!
//! Persistence is PostgreSQL through `DbClient`; tests run the same router
//! over `rackview_storage::MockStorage`.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod migrations;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{resolve_bind_addr, ApiConfig};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use extractors::{ApiJson, ApiQuery, PathId};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::HealthProbe;
pub use types::*;
