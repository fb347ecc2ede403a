//! RackView Storage - Storage Traits and Mock Implementation
//!
//! Defines the storage abstraction consumed by the placement validator and the
//! API services. The PostgreSQL implementation lives in rackview-api
//! (`DbClient`); `MockStorage` keeps everything in memory for tests.

pub mod mock;
pub mod placement;
pub mod store;

pub use mock::MockStorage;
pub use placement::{check_overlap, validate_placement};
pub use store::{DeviceLookup, InventoryStore};

use rackview_core::{Device, DeviceSpecs, DeviceStatus, DeviceType, Rack};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Partial update for a device. `None` keeps the current value.
///
/// The optional string columns are tri-state: `None` keeps the value,
/// `Some(None)` clears it, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub device_type: Option<DeviceType>,
    pub position_u: Option<i32>,
    pub size_u: Option<i32>,
    pub status: Option<DeviceStatus>,
    pub model: Option<String>,
    pub ip_address: Option<Option<String>>,
    pub health_check_url: Option<Option<String>>,
    /// Replaces the whole spec map when present.
    pub specs: Option<DeviceSpecs>,
}

impl DevicePatch {
    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == DevicePatch::default()
    }

    /// True when the patch moves or resizes the device.
    pub fn touches_placement(&self) -> bool {
        self.position_u.is_some() || self.size_u.is_some()
    }

    /// `(top, height)` the device would have after this patch.
    pub fn merged_placement(&self, current: &Device) -> (i32, i32) {
        (
            self.position_u.unwrap_or(current.position_u),
            self.size_u.unwrap_or(current.size_u),
        )
    }

    /// Apply the patch to a device record in place.
    pub fn apply_to(self, device: &mut Device) {
        if let Some(name) = self.name {
            device.name = name;
        }
        if let Some(icon) = self.icon {
            device.icon = icon;
        }
        if let Some(device_type) = self.device_type {
            device.device_type = device_type;
        }
        if let Some(position_u) = self.position_u {
            device.position_u = position_u;
        }
        if let Some(size_u) = self.size_u {
            device.size_u = size_u;
        }
        if let Some(status) = self.status {
            device.status = status;
        }
        if let Some(model) = self.model {
            device.model = model;
        }
        if let Some(ip_address) = self.ip_address {
            device.ip_address = ip_address;
        }
        if let Some(health_check_url) = self.health_check_url {
            device.health_check_url = health_check_url;
        }
        if let Some(specs) = self.specs {
            device.specs = specs;
        }
    }
}

/// Partial update for a rack. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RackPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub size_u: Option<i32>,
}

impl RackPatch {
    pub fn is_empty(&self) -> bool {
        *self == RackPatch::default()
    }

    pub fn apply_to(self, rack: &mut Rack) {
        if let Some(name) = self.name {
            rack.name = name;
        }
        if let Some(description) = self.description {
            rack.description = description;
        }
        if let Some(size_u) = self.size_u {
            rack.size_u = size_u;
        }
    }
}
