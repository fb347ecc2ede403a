//! Async storage traits.
//!
//! `DeviceLookup` is the narrow read capability the placement validator
//! needs. `InventoryStore` adds the CRUD surface used by the API services.

use async_trait::async_trait;
use rackview_core::{
    ConnectionId, Device, DeviceId, DeviceStatus, MountedDevice, NetworkConnection,
    NewConnection, NewDevice, NewRack, Rack, RackId, StorageResult,
};

/// Read access to rack sizes and the devices mounted in a rack.
#[async_trait]
pub trait DeviceLookup: Send + Sync {
    /// Size of the rack in units, or `None` if the rack does not exist.
    async fn rack_size_u(&self, rack_id: RackId) -> StorageResult<Option<i32>>;

    /// Placement records of every device in the rack. Order is unspecified.
    async fn devices_in_rack(&self, rack_id: RackId) -> StorageResult<Vec<MountedDevice>>;
}

/// Full persistence surface for racks, devices, and connections.
///
/// Implementations must refuse a device insert or update whose span overlaps
/// another device in the same rack with `StorageError::Conflict`, so that two
/// requests racing past the placement check cannot both persist.
#[async_trait]
pub trait InventoryStore: DeviceLookup {
    /// Cheap round-trip used by readiness checks.
    async fn ping(&self) -> StorageResult<()>;

    // ========================================================================
    // RACK OPERATIONS
    // ========================================================================

    /// List racks ordered by id, without devices.
    async fn rack_list(&self) -> StorageResult<Vec<Rack>>;

    /// Get a rack by id, without devices.
    async fn rack_get(&self, id: RackId) -> StorageResult<Option<Rack>>;

    async fn rack_insert(&self, rack: &NewRack) -> StorageResult<Rack>;

    /// Overwrite name, description, and size of an existing rack.
    async fn rack_update(&self, rack: &Rack) -> StorageResult<Rack>;

    /// Delete a rack and everything mounted in it. Returns false if missing.
    async fn rack_delete(&self, id: RackId) -> StorageResult<bool>;

    // ========================================================================
    // DEVICE OPERATIONS
    // ========================================================================

    /// List devices with specs, top to bottom. All racks when `rack_id` is `None`.
    async fn device_list(&self, rack_id: Option<RackId>) -> StorageResult<Vec<Device>>;

    async fn device_get(&self, id: DeviceId) -> StorageResult<Option<Device>>;

    async fn device_insert(&self, device: &NewDevice) -> StorageResult<Device>;

    /// Overwrite every mutable column of an existing device and replace its specs.
    /// `rack_id` and `created_at` are never changed.
    async fn device_update(&self, device: &Device) -> StorageResult<Device>;

    /// Record a status reported by a health probe. Returns false if missing.
    async fn device_set_status(&self, id: DeviceId, status: DeviceStatus) -> StorageResult<bool>;

    /// Delete a device and its connections. Returns false if missing.
    async fn device_delete(&self, id: DeviceId) -> StorageResult<bool>;

    // ========================================================================
    // CONNECTION OPERATIONS
    // ========================================================================

    /// List connections ordered by id. Endpoint devices are not resolved.
    async fn connection_list(&self) -> StorageResult<Vec<NetworkConnection>>;

    async fn connection_get(&self, id: ConnectionId) -> StorageResult<Option<NetworkConnection>>;

    async fn connection_exists(&self, source: DeviceId, target: DeviceId) -> StorageResult<bool>;

    async fn connection_insert(&self, connection: &NewConnection)
        -> StorageResult<NetworkConnection>;

    async fn connection_delete(&self, id: ConnectionId) -> StorageResult<bool>;
}
