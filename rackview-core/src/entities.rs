//! Entity records for racks, devices, and network connections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    ConnectionId, DeviceId, DeviceStatus, DeviceType, RackId, RackUnitSpan, Timestamp,
};

/// Free-form key/value hardware specs attached to a device (CPU, RAM, ...).
pub type DeviceSpecs = BTreeMap<String, String>;

// ============================================================================
// RACK
// ============================================================================

/// A physical rack with `size_u` mounting units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Rack {
    pub id: RackId,
    pub name: String,
    pub description: String,
    pub size_u: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    /// Mounted devices, top to bottom. Only populated on single-rack reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
}

/// Insert payload for a rack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRack {
    pub name: String,
    pub description: String,
    pub size_u: i32,
}

// ============================================================================
// DEVICE
// ============================================================================

/// A device mounted in a rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Device {
    pub id: DeviceId,
    pub rack_id: RackId,
    pub name: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Top rack unit occupied by the device.
    pub position_u: i32,
    /// Number of rack units occupied, counted downward from `position_u`.
    pub size_u: i32,
    pub status: DeviceStatus,
    pub model: String,
    pub ip_address: Option<String>,
    pub health_check_url: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub specs: DeviceSpecs,
}

impl Device {
    /// Rack units occupied by this device.
    pub fn span(&self) -> RackUnitSpan {
        RackUnitSpan::from_top_and_height(self.position_u, self.size_u)
    }

    /// Placement view of this device.
    pub fn mounted(&self) -> MountedDevice {
        MountedDevice {
            id: self.id,
            top: self.position_u,
            height: self.size_u,
        }
    }
}

/// Insert payload for a device. Defaults are already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub rack_id: RackId,
    pub name: String,
    pub icon: String,
    pub device_type: DeviceType,
    pub position_u: i32,
    pub size_u: i32,
    pub status: DeviceStatus,
    pub model: String,
    pub ip_address: Option<String>,
    pub health_check_url: Option<String>,
    pub specs: DeviceSpecs,
}

impl NewDevice {
    /// Rack units the new device would occupy.
    pub fn span(&self) -> RackUnitSpan {
        RackUnitSpan::from_top_and_height(self.position_u, self.size_u)
    }
}

/// Minimal placement record of a device: what the overlap check reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountedDevice {
    pub id: DeviceId,
    pub top: i32,
    pub height: i32,
}

impl MountedDevice {
    pub fn span(&self) -> RackUnitSpan {
        RackUnitSpan::from_top_and_height(self.top, self.height)
    }
}

// ============================================================================
// NETWORK CONNECTION
// ============================================================================

/// A cable between two devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NetworkConnection {
    pub id: ConnectionId,
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    pub connection_type: String,
    pub port_info: String,
    pub speed: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_device: Option<Device>,
}

/// Insert payload for a network connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConnection {
    pub source_device_id: DeviceId,
    pub target_device_id: DeviceId,
    pub connection_type: String,
    pub port_info: String,
    pub speed: String,
}
