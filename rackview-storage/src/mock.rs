//! In-memory storage for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use rackview_core::{
    overlaps_any, ConnectionId, Device, DeviceId, DeviceStatus, EntityIdType, EntityType,
    MountedDevice, NetworkConnection, NewConnection, NewDevice, NewRack, Rack, RackId,
    RackUnitSpan, StorageError, StorageResult,
};

use crate::{DeviceLookup, InventoryStore};

#[derive(Debug, Default)]
struct Tables {
    racks: BTreeMap<RackId, Rack>,
    devices: BTreeMap<DeviceId, Device>,
    connections: BTreeMap<ConnectionId, NetworkConnection>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn mounted_in(&self, rack_id: RackId) -> Vec<MountedDevice> {
        self.devices
            .values()
            .filter(|d| d.rack_id == rack_id)
            .map(Device::mounted)
            .collect()
    }

    /// The same disjointness rule the database enforces with its exclusion
    /// constraint, checked under the write lock that performs the mutation.
    fn ensure_free(
        &self,
        rack_id: RackId,
        span: &RackUnitSpan,
        exclude: Option<DeviceId>,
    ) -> StorageResult<()> {
        if overlaps_any(span, &self.mounted_in(rack_id), exclude) {
            return Err(StorageError::Conflict {
                entity_type: EntityType::Device,
                reason: format!("span {}..={} is occupied in rack {}", span.bottom(), span.top(), rack_id),
            });
        }
        Ok(())
    }

    fn ensure_rack(&self, rack_id: RackId) -> StorageResult<()> {
        if !self.racks.contains_key(&rack_id) {
            return Err(StorageError::MissingReference {
                entity_type: EntityType::Device,
                reason: format!("rack {} does not exist", rack_id),
            });
        }
        Ok(())
    }
}

/// In-memory mock storage for testing.
///
/// One lock covers every table so multi-table writes (cascading deletes,
/// check-then-insert) are atomic.
#[derive(Debug, Default)]
pub struct MockStorage {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    device_list_calls: AtomicUsize,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        if let Ok(mut tables) = self.tables.write() {
            *tables = Tables::default();
        }
    }

    pub fn rack_count(&self) -> usize {
        self.tables.read().map(|t| t.racks.len()).unwrap_or(0)
    }

    pub fn device_count(&self) -> usize {
        self.tables.read().map(|t| t.devices.len()).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.tables.read().map(|t| t.connections.len()).unwrap_or(0)
    }

    /// Number of `device_list` calls so far, successful or not.
    pub fn device_list_calls(&self) -> usize {
        self.device_list_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                reason: "mock storage marked unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.check_available()?;
        self.tables.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.check_available()?;
        self.tables.write().map_err(|_| StorageError::LockPoisoned)
    }
}

#[async_trait]
impl DeviceLookup for MockStorage {
    async fn rack_size_u(&self, rack_id: RackId) -> StorageResult<Option<i32>> {
        let tables = self.read()?;
        Ok(tables.racks.get(&rack_id).map(|r| r.size_u))
    }

    async fn devices_in_rack(&self, rack_id: RackId) -> StorageResult<Vec<MountedDevice>> {
        let tables = self.read()?;
        Ok(tables.mounted_in(rack_id))
    }
}

#[async_trait]
impl InventoryStore for MockStorage {
    async fn ping(&self) -> StorageResult<()> {
        self.read().map(|_| ())
    }

    // === Rack Operations ===

    async fn rack_list(&self) -> StorageResult<Vec<Rack>> {
        let tables = self.read()?;
        Ok(tables.racks.values().cloned().collect())
    }

    async fn rack_get(&self, id: RackId) -> StorageResult<Option<Rack>> {
        let tables = self.read()?;
        Ok(tables.racks.get(&id).cloned())
    }

    async fn rack_insert(&self, rack: &NewRack) -> StorageResult<Rack> {
        let mut tables = self.write()?;
        let now = Utc::now();
        let stored = Rack {
            id: RackId::new(tables.next_id()),
            name: rack.name.clone(),
            description: rack.description.clone(),
            size_u: rack.size_u,
            created_at: now,
            updated_at: now,
            devices: None,
        };
        tables.racks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn rack_update(&self, rack: &Rack) -> StorageResult<Rack> {
        let mut tables = self.write()?;
        let stored = tables.racks.get_mut(&rack.id).ok_or(StorageError::NotFound {
            entity_type: EntityType::Rack,
            id: rack.id.as_i32(),
        })?;

        stored.name = rack.name.clone();
        stored.description = rack.description.clone();
        stored.size_u = rack.size_u;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn rack_delete(&self, id: RackId) -> StorageResult<bool> {
        let mut tables = self.write()?;
        if tables.racks.remove(&id).is_none() {
            return Ok(false);
        }

        let removed: Vec<DeviceId> = tables
            .devices
            .values()
            .filter(|d| d.rack_id == id)
            .map(|d| d.id)
            .collect();
        tables.devices.retain(|_, d| d.rack_id != id);
        tables.connections.retain(|_, c| {
            !removed.contains(&c.source_device_id) && !removed.contains(&c.target_device_id)
        });
        Ok(true)
    }

    // === Device Operations ===

    async fn device_list(&self, rack_id: Option<RackId>) -> StorageResult<Vec<Device>> {
        self.device_list_calls.fetch_add(1, Ordering::SeqCst);
        let tables = self.read()?;
        let mut devices: Vec<Device> = tables
            .devices
            .values()
            .filter(|d| rack_id.map_or(true, |r| d.rack_id == r))
            .cloned()
            .collect();
        devices.sort_by(|a, b| {
            a.rack_id
                .cmp(&b.rack_id)
                .then_with(|| b.position_u.cmp(&a.position_u))
        });
        Ok(devices)
    }

    async fn device_get(&self, id: DeviceId) -> StorageResult<Option<Device>> {
        let tables = self.read()?;
        Ok(tables.devices.get(&id).cloned())
    }

    async fn device_insert(&self, device: &NewDevice) -> StorageResult<Device> {
        let mut tables = self.write()?;
        tables.ensure_rack(device.rack_id)?;
        tables.ensure_free(device.rack_id, &device.span(), None)?;

        let now = Utc::now();
        let stored = Device {
            id: DeviceId::new(tables.next_id()),
            rack_id: device.rack_id,
            name: device.name.clone(),
            icon: device.icon.clone(),
            device_type: device.device_type,
            position_u: device.position_u,
            size_u: device.size_u,
            status: device.status,
            model: device.model.clone(),
            ip_address: device.ip_address.clone(),
            health_check_url: device.health_check_url.clone(),
            created_at: now,
            updated_at: now,
            specs: device.specs.clone(),
        };
        tables.devices.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn device_update(&self, device: &Device) -> StorageResult<Device> {
        let mut tables = self.write()?;
        let (rack_id, created_at) = match tables.devices.get(&device.id) {
            Some(existing) => (existing.rack_id, existing.created_at),
            None => {
                return Err(StorageError::NotFound {
                    entity_type: EntityType::Device,
                    id: device.id.as_i32(),
                })
            }
        };
        tables.ensure_free(rack_id, &device.span(), Some(device.id))?;

        // A device never changes rack through an update.
        let mut stored = device.clone();
        stored.rack_id = rack_id;
        stored.created_at = created_at;
        stored.updated_at = Utc::now();
        tables.devices.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn device_set_status(&self, id: DeviceId, status: DeviceStatus) -> StorageResult<bool> {
        let mut tables = self.write()?;
        match tables.devices.get_mut(&id) {
            Some(device) => {
                device.status = status;
                device.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn device_delete(&self, id: DeviceId) -> StorageResult<bool> {
        let mut tables = self.write()?;
        if tables.devices.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .connections
            .retain(|_, c| c.source_device_id != id && c.target_device_id != id);
        Ok(true)
    }

    // === Connection Operations ===

    async fn connection_list(&self) -> StorageResult<Vec<NetworkConnection>> {
        let tables = self.read()?;
        Ok(tables.connections.values().cloned().collect())
    }

    async fn connection_get(&self, id: ConnectionId) -> StorageResult<Option<NetworkConnection>> {
        let tables = self.read()?;
        Ok(tables.connections.get(&id).cloned())
    }

    async fn connection_exists(&self, source: DeviceId, target: DeviceId) -> StorageResult<bool> {
        let tables = self.read()?;
        Ok(tables
            .connections
            .values()
            .any(|c| c.source_device_id == source && c.target_device_id == target))
    }

    async fn connection_insert(
        &self,
        connection: &NewConnection,
    ) -> StorageResult<NetworkConnection> {
        let mut tables = self.write()?;
        for endpoint in [connection.source_device_id, connection.target_device_id] {
            if !tables.devices.contains_key(&endpoint) {
                return Err(StorageError::MissingReference {
                    entity_type: EntityType::Connection,
                    reason: format!("device {} does not exist", endpoint),
                });
            }
        }
        let duplicate = tables.connections.values().any(|c| {
            c.source_device_id == connection.source_device_id
                && c.target_device_id == connection.target_device_id
        });
        if duplicate {
            return Err(StorageError::Conflict {
                entity_type: EntityType::Connection,
                reason: "connection already exists between these devices".to_string(),
            });
        }

        let stored = NetworkConnection {
            id: ConnectionId::new(tables.next_id()),
            source_device_id: connection.source_device_id,
            target_device_id: connection.target_device_id,
            connection_type: connection.connection_type.clone(),
            port_info: connection.port_info.clone(),
            speed: connection.speed.clone(),
            created_at: Utc::now(),
            source_device: None,
            target_device: None,
        };
        tables.connections.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn connection_delete(&self, id: ConnectionId) -> StorageResult<bool> {
        let mut tables = self.write()?;
        Ok(tables.connections.remove(&id).is_some())
    }
}
