//! Device Service
//!
//! Device CRUD. Every write that moves or resizes a device goes through
//! `validate_placement` before the row is persisted.

use rackview_core::{Device, DeviceId, RackId};
use rackview_storage::{validate_placement, InventoryStore};

use crate::error::{ApiError, ApiResult};
use crate::types::{CreateDeviceRequest, UpdateDeviceRequest};

/// List devices top to bottom, optionally restricted to one rack.
pub async fn list_devices(
    store: &dyn InventoryStore,
    rack_id: Option<RackId>,
) -> ApiResult<Vec<Device>> {
    Ok(store.device_list(rack_id).await?)
}

/// Get a device with its specs.
pub async fn get_device(store: &dyn InventoryStore, id: DeviceId) -> ApiResult<Device> {
    store
        .device_get(id)
        .await?
        .ok_or_else(|| ApiError::device_not_found(id))
}

/// Create a device after validating its placement in the target rack.
pub async fn create_device(
    store: &dyn InventoryStore,
    req: CreateDeviceRequest,
) -> ApiResult<Device> {
    req.validate()?;
    let new_device = req.into_new_device();

    validate_placement(
        store,
        new_device.rack_id,
        new_device.position_u,
        new_device.size_u,
        None,
    )
    .await?;

    let device = store.device_insert(&new_device).await?;
    tracing::info!(
        device_id = %device.id,
        rack_id = %device.rack_id,
        position_u = device.position_u,
        size_u = device.size_u,
        "Device created"
    );
    Ok(device)
}

/// Apply a partial update. A move or resize is validated against the other
/// devices in the rack, ignoring the device's own current span.
pub async fn update_device(
    store: &dyn InventoryStore,
    id: DeviceId,
    req: UpdateDeviceRequest,
) -> ApiResult<Device> {
    let patch = req.into_patch()?;
    let mut device = get_device(store, id).await?;

    if patch.is_empty() {
        return Ok(device);
    }

    if patch.touches_placement() {
        let (top, height) = patch.merged_placement(&device);
        validate_placement(store, device.rack_id, top, height, Some(id)).await?;
    }

    patch.apply_to(&mut device);
    let updated = store.device_update(&device).await?;
    tracing::info!(device_id = %id, "Device updated");
    Ok(updated)
}

/// Delete a device and its connections.
pub async fn delete_device(store: &dyn InventoryStore, id: DeviceId) -> ApiResult<()> {
    if !store.device_delete(id).await? {
        return Err(ApiError::device_not_found(id));
    }
    tracing::info!(device_id = %id, "Device deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rackview_core::{EntityIdType, NewRack};
    use rackview_storage::MockStorage;
    use serde_json::json;

    async fn rack(store: &MockStorage, size_u: i32) -> RackId {
        store
            .rack_insert(&NewRack {
                name: "r1".to_string(),
                description: String::new(),
                size_u,
            })
            .await
            .unwrap()
            .id
    }

    fn create_req(rack_id: RackId, top: i32, height: i32) -> CreateDeviceRequest {
        serde_json::from_value(json!({
            "rack_id": rack_id,
            "name": format!("dev-{}-{}", top, height),
            "type": "server",
            "position_u": top,
            "size_u": height,
        }))
        .unwrap()
    }

    fn update_req(value: serde_json::Value) -> UpdateDeviceRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_span_below_lowest_slot() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 42).await;

        assert!(create_device(&store, create_req(rack_id, 42, 2)).await.is_ok());
        let err = create_device(&store, create_req(rack_id, 1, 2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PlacementInvalid);
        assert_eq!(err.details, Some(json!({"bound": "below_lowest_slot"})));
    }

    #[tokio::test]
    async fn test_create_rejects_overlap_and_accepts_free_span() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 10).await;
        create_device(&store, create_req(rack_id, 10, 4)).await.unwrap();

        let err = create_device(&store, create_req(rack_id, 8, 2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PlacementConflict);

        let ok = create_device(&store, create_req(rack_id, 6, 6)).await.unwrap();
        assert_eq!(ok.span().bottom(), 1);
        assert_eq!(store.device_count(), 2);
    }

    #[tokio::test]
    async fn test_create_in_missing_rack_is_not_found() {
        let store = MockStorage::new();
        let err = create_device(&store, create_req(RackId::new(99), 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RackNotFound);
    }

    #[tokio::test]
    async fn test_update_in_place_excludes_self() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 10).await;
        let device = create_device(&store, create_req(rack_id, 10, 4)).await.unwrap();

        let updated = update_device(
            &store,
            device.id,
            update_req(json!({"position_u": 10, "size_u": 4})),
        )
        .await
        .unwrap();
        assert_eq!(updated.span(), device.span());
    }

    #[tokio::test]
    async fn test_update_move_into_neighbour_conflicts() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 10).await;
        create_device(&store, create_req(rack_id, 10, 2)).await.unwrap();
        let lower = create_device(&store, create_req(rack_id, 4, 2)).await.unwrap();

        let err = update_device(&store, lower.id, update_req(json!({"size_u": 8})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PlacementInvalid);

        let err = update_device(&store, lower.id, update_req(json!({"position_u": 9})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PlacementConflict);

        let unchanged = get_device(&store, lower.id).await.unwrap();
        assert_eq!(unchanged.position_u, 4);
    }

    #[tokio::test]
    async fn test_empty_patch_returns_current_device() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 10).await;
        let device = create_device(&store, create_req(rack_id, 5, 1)).await.unwrap();

        let same = update_device(&store, device.id, update_req(json!({})))
            .await
            .unwrap();
        assert_eq!(same, device);
    }

    #[tokio::test]
    async fn test_update_clears_ip_address_with_null() {
        let store = MockStorage::new();
        let rack_id = rack(&store, 10).await;
        let mut req = create_req(rack_id, 5, 1);
        req.ip_address = Some("10.0.0.5".to_string());
        let device = create_device(&store, req).await.unwrap();
        assert_eq!(device.ip_address.as_deref(), Some("10.0.0.5"));

        let updated = update_device(&store, device.id, update_req(json!({"ip_address": null})))
            .await
            .unwrap();
        assert_eq!(updated.ip_address, None);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_device() {
        let store = MockStorage::new();
        let err = update_device(&store, DeviceId::new(5), update_req(json!({"name": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DeviceNotFound);

        let err = delete_device(&store, DeviceId::new(5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DeviceNotFound);
    }
}
