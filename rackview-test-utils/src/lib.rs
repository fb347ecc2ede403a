//! RackView Test Utilities
//!
//! Shared test infrastructure for the RackView workspace:
//! - Proptest generators for rack geometry and entity payloads
//! - Fixtures for common racks and devices
//! - Assertions over storage and placement errors

// Re-export mock storage from its source crate
pub use rackview_storage::MockStorage;

// Re-export core types for convenience
pub use rackview_core::{
    ConnectionId, Device, DeviceId, DeviceSpecs, DeviceStatus, DeviceType, EntityIdType,
    EntityType, MountedDevice, NetworkConnection, NewConnection, NewDevice, NewRack,
    PlacementError, PlacementResult, Rack, RackId, RackUnitSpan, StorageError, StorageResult,
    Timestamp,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for rack geometry and insert payloads.

    use super::*;
    use proptest::prelude::*;

    /// Rack heights seen in practice, 1U through 52U.
    pub fn arb_rack_size() -> impl Strategy<Value = i32> {
        1..=52i32
    }

    pub fn arb_device_type() -> impl Strategy<Value = DeviceType> {
        prop_oneof![
            Just(DeviceType::Server),
            Just(DeviceType::Network),
            Just(DeviceType::Storage),
        ]
    }

    pub fn arb_device_status() -> impl Strategy<Value = DeviceStatus> {
        prop_oneof![
            Just(DeviceStatus::Online),
            Just(DeviceStatus::Offline),
            Just(DeviceStatus::Warning),
            Just(DeviceStatus::Unknown),
        ]
    }

    /// A `(top, height)` pair that fits inside a rack of `rack_size` units.
    pub fn arb_fitting_placement(rack_size: i32) -> impl Strategy<Value = (i32, i32)> {
        (1..=rack_size).prop_flat_map(|top| (Just(top), 1..=top))
    }

    pub fn arb_new_rack() -> impl Strategy<Value = NewRack> {
        ("[a-z]{1,12}", arb_rack_size()).prop_map(|(name, size_u)| NewRack {
            name,
            description: String::new(),
            size_u,
        })
    }

    /// A device payload for `rack_id` that fits inside a rack of `rack_size`.
    pub fn arb_new_device(rack_id: RackId, rack_size: i32) -> impl Strategy<Value = NewDevice> {
        (
            "[a-z]{1,12}",
            arb_device_type(),
            arb_device_status(),
            arb_fitting_placement(rack_size),
        )
            .prop_map(move |(name, device_type, status, (top, height))| {
                let mut device = fixtures::new_device(rack_id, top, height);
                device.name = name;
                device.device_type = device_type;
                device.status = status;
                device
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built payloads and seeded storage for common scenarios.

    use super::*;

    /// A rack payload with the given height.
    pub fn new_rack(name: &str, size_u: i32) -> NewRack {
        NewRack {
            name: name.to_string(),
            description: String::new(),
            size_u,
        }
    }

    /// A 1U-or-taller server payload recorded at `top`.
    pub fn new_device(rack_id: RackId, top: i32, height: i32) -> NewDevice {
        NewDevice {
            rack_id,
            name: format!("dev-u{}", top),
            icon: "🖥️".to_string(),
            device_type: DeviceType::Server,
            position_u: top,
            size_u: height,
            status: DeviceStatus::Online,
            model: "R650".to_string(),
            ip_address: None,
            health_check_url: None,
            specs: DeviceSpecs::new(),
        }
    }

    /// A plain connection payload between two devices.
    pub fn new_connection(source: DeviceId, target: DeviceId) -> NewConnection {
        NewConnection {
            source_device_id: source,
            target_device_id: target,
            connection_type: "ethernet".to_string(),
            port_info: "eth0".to_string(),
            speed: "10G".to_string(),
        }
    }

    /// A rack of `size_u` holding one device per `(top, height)` pair.
    ///
    /// Placements are inserted as given; callers are expected to pass
    /// non-overlapping spans.
    pub async fn seeded_rack(
        storage: &MockStorage,
        size_u: i32,
        placements: &[(i32, i32)],
    ) -> StorageResult<(Rack, Vec<Device>)> {
        use rackview_storage::InventoryStore;

        let rack = storage.rack_insert(&new_rack("seeded", size_u)).await?;
        let mut devices = Vec::with_capacity(placements.len());
        for &(top, height) in placements {
            devices.push(storage.device_insert(&new_device(rack.id, top, height)).await?);
        }
        Ok((rack, devices))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for storage and placement results.

    use super::*;

    /// Assert that a StorageResult is a NotFound for `entity_type`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &StorageResult<T>, entity_type: EntityType) {
        match result {
            Err(StorageError::NotFound { entity_type: et, .. }) => {
                assert_eq!(*et, entity_type, "Wrong entity type in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", entity_type, other),
        }
    }

    /// Assert that a StorageResult is a Conflict for `entity_type`.
    #[track_caller]
    pub fn assert_conflict<T: std::fmt::Debug>(result: &StorageResult<T>, entity_type: EntityType) {
        match result {
            Err(StorageError::Conflict { entity_type: et, .. }) => {
                assert_eq!(*et, entity_type, "Wrong entity type in Conflict error");
            }
            other => panic!("Expected Conflict error for {:?}, got: {:?}", entity_type, other),
        }
    }

    /// Assert that a placement was rejected for overlapping another device.
    #[track_caller]
    pub fn assert_placement_conflict<T: std::fmt::Debug>(result: &PlacementResult<T>) {
        match result {
            Err(PlacementError::PlacementConflict { .. }) => {}
            other => panic!("Expected PlacementConflict, got: {:?}", other),
        }
    }

    /// Assert that a placement was rejected for leaving the rack.
    #[track_caller]
    pub fn assert_placement_invalid<T: std::fmt::Debug>(result: &PlacementResult<T>) {
        match result {
            Err(PlacementError::PlacementInvalid(_)) => {}
            other => panic!("Expected PlacementInvalid, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;
    use rackview_core::validate_bounds;

    proptest! {
        #[test]
        fn prop_generated_devices_fit_their_rack(
            (size, device) in arb_rack_size()
                .prop_flat_map(|size| (Just(size), arb_new_device(RackId::new(1), size)))
        ) {
            prop_assert!(validate_bounds(size, device.position_u, device.size_u).is_ok());
            prop_assert_eq!(device.rack_id, RackId::new(1));
        }
    }

    #[test]
    fn test_new_device_fixture_defaults() {
        let device = fixtures::new_device(RackId::new(1), 10, 2);
        assert_eq!(device.position_u, 10);
        assert_eq!(device.size_u, 2);
        assert_eq!(device.status, DeviceStatus::Online);
        assert!(device.ip_address.is_none());
    }
}
