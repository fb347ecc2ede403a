//! Request and response types for the REST API.
//!
//! Entity responses reuse the rackview-core types directly; this module only
//! holds the request shapes and the few response envelopes that have no core
//! counterpart.

use rackview_core::{
    DeviceId, DeviceSpecs, DeviceStatus, DeviceType, NewConnection, NewDevice, NewRack, RackId,
    Timestamp, ValidationError,
};
use rackview_storage::{DevicePatch, RackPatch};
use serde::{Deserialize, Deserializer, Serialize};

/// Icon given to a device created without one.
pub const DEFAULT_DEVICE_ICON: &str = "🖥️";

// ============================================================================
// HELPERS
// ============================================================================

/// Deserialize a present field as `Some(value)`, so that together with
/// `#[serde(default)]` an absent field stays `None` and an explicit `null`
/// becomes `Some(None)`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim an optional string and treat blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

fn require_at_least_one(field: &str, value: i32) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::invalid(field, "must be at least 1"));
    }
    Ok(())
}

// ============================================================================
// RACK REQUESTS
// ============================================================================

/// Request to create a rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateRackRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Number of mounting units, at least 1
    pub size_u: i32,
}

impl CreateRackRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        require_at_least_one("size_u", self.size_u)
    }

    pub fn into_new_rack(self) -> NewRack {
        NewRack {
            name: self.name.trim().to_string(),
            description: self.description,
            size_u: self.size_u,
        }
    }
}

/// Request to update a rack. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateRackRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size_u: Option<i32>,
}

impl UpdateRackRequest {
    pub fn into_patch(self) -> Result<RackPatch, ValidationError> {
        if let Some(name) = &self.name {
            require_name("name", name)?;
        }
        if let Some(size_u) = self.size_u {
            require_at_least_one("size_u", size_u)?;
        }
        Ok(RackPatch {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description,
            size_u: self.size_u,
        })
    }
}

// ============================================================================
// DEVICE REQUESTS
// ============================================================================

/// Query parameters for `GET /api/devices`.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListDevicesParams {
    /// Only list devices mounted in this rack
    pub rack_id: Option<String>,
}

impl ListDevicesParams {
    /// The rack filter. A value that is not an integer is ignored.
    pub fn rack_id(&self) -> Option<RackId> {
        self.rack_id.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

/// Request to create a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateDeviceRequest {
    pub rack_id: RackId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Top-most occupied unit
    pub position_u: i32,
    /// Height in units
    pub size_u: i32,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub health_check_url: Option<String>,
    #[serde(default)]
    pub specs: DeviceSpecs,
}

impl CreateDeviceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        require_at_least_one("position_u", self.position_u)?;
        require_at_least_one("size_u", self.size_u)
    }

    /// Apply defaults and normalize blank optional strings.
    pub fn into_new_device(self) -> NewDevice {
        NewDevice {
            rack_id: self.rack_id,
            name: self.name.trim().to_string(),
            icon: non_blank(self.icon).unwrap_or_else(|| DEFAULT_DEVICE_ICON.to_string()),
            device_type: self.device_type,
            position_u: self.position_u,
            size_u: self.size_u,
            status: self.status.unwrap_or_default(),
            model: self.model,
            ip_address: non_blank(self.ip_address),
            health_check_url: non_blank(self.health_check_url),
            specs: self.specs,
        }
    }
}

/// Request to update a device.
///
/// `ip_address` and `health_check_url` distinguish an absent field (keep)
/// from an explicit `null` or blank string (clear).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateDeviceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub position_u: Option<i32>,
    #[serde(default)]
    pub size_u: Option<i32>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub ip_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub health_check_url: Option<Option<String>>,
    #[serde(default)]
    pub specs: Option<DeviceSpecs>,
}

impl UpdateDeviceRequest {
    pub fn into_patch(self) -> Result<DevicePatch, ValidationError> {
        if let Some(name) = &self.name {
            require_name("name", name)?;
        }
        if let Some(position_u) = self.position_u {
            require_at_least_one("position_u", position_u)?;
        }
        if let Some(size_u) = self.size_u {
            require_at_least_one("size_u", size_u)?;
        }

        Ok(DevicePatch {
            name: self.name.map(|n| n.trim().to_string()),
            icon: non_blank(self.icon),
            device_type: self.device_type,
            position_u: self.position_u,
            size_u: self.size_u,
            status: self.status,
            model: self.model,
            ip_address: self.ip_address.map(non_blank),
            health_check_url: self.health_check_url.map(non_blank),
            specs: self.specs,
        })
    }
}

// ============================================================================
// CONNECTION REQUESTS
// ============================================================================

/// Request to create a network connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateConnectionRequest {
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    #[serde(default)]
    pub connection_type: String,
    #[serde(default)]
    pub port_info: String,
    #[serde(default)]
    pub speed: String,
}

impl CreateConnectionRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_device_id == self.target_device_id {
            return Err(ValidationError::invalid(
                "target_device_id",
                "a device cannot be connected to itself",
            ));
        }
        Ok(())
    }

    pub fn into_new_connection(self) -> NewConnection {
        NewConnection {
            source_device_id: self.source_device_id,
            target_device_id: self.target_device_id,
            connection_type: self.connection_type,
            port_info: self.port_info,
            speed: self.speed,
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Outcome of a device health probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthCheckResult {
    pub status: DeviceStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
}

/// Plain acknowledgement body, e.g. after a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
