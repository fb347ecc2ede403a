//! OpenAPI Specification for the RackView API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{Readiness, ReadinessReport, StorageCheck};
use crate::routes::{connection, device, health, rack};
use crate::types::*;

use rackview_core::{
    ConnectionId, Device, DeviceId, DeviceStatus, DeviceType, NetworkConnection, Rack, RackId,
};

/// OpenAPI document for the RackView API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "RackView API",
        version = "0.3.0",
        description = "Rack, device, and network connection inventory with rack-unit placement validation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Racks", description = "Physical racks and their mounted devices"),
        (name = "Devices", description = "Devices mounted in racks, placement-checked on write"),
        (name = "Network", description = "Cabling between devices"),
        (name = "Health", description = "Service liveness and readiness")
    ),
    paths(
        // === Rack Routes ===
        rack::list_racks,
        rack::get_rack,
        rack::create_rack,
        rack::update_rack,
        rack::delete_rack,

        // === Device Routes ===
        device::list_devices,
        device::get_device,
        device::create_device,
        device::update_device,
        device::delete_device,
        device::check_device_health,

        // === Connection Routes ===
        connection::list_connections,
        connection::get_connection,
        connection::create_connection,
        connection::delete_connection,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Entities ===
            Rack, Device, NetworkConnection, RackId, DeviceId, ConnectionId,
            DeviceType, DeviceStatus,

            // === Requests ===
            CreateRackRequest, UpdateRackRequest,
            CreateDeviceRequest, UpdateDeviceRequest,
            CreateConnectionRequest,

            // === Responses ===
            HealthCheckResult, MessageResponse,
            Readiness, ReadinessReport, StorageCheck,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "RackView API");
        let tags = openapi.tags.as_ref().map(|t| t.len()).unwrap_or_default();
        assert_eq!(tags, 4);
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/api/racks"));
        assert!(paths.contains_key("/api/racks/{id}"));
        assert!(paths.contains_key("/api/devices"));
        assert!(paths.contains_key("/api/devices/{id}/health-check"));
        assert!(paths.contains_key("/api/network/connections/{id}"));
        assert!(paths.contains_key("/health/ready"));
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("PLACEMENT_CONFLICT"));
        Ok(())
    }
}
