//! Network Connection Service
//!
//! Connections are returned with their endpoint devices embedded when those
//! can be loaded. A failed endpoint lookup leaves the field empty rather than
//! failing the whole response.

use std::collections::HashMap;

use rackview_core::{ConnectionId, Device, DeviceId, NetworkConnection};
use rackview_storage::InventoryStore;

use crate::error::{ApiError, ApiResult};
use crate::types::CreateConnectionRequest;

/// Embed endpoints for a batch of connections from one device listing.
async fn embed_all_endpoints(store: &dyn InventoryStore, connections: &mut [NetworkConnection]) {
    if connections.is_empty() {
        return;
    }
    let devices: HashMap<DeviceId, Device> = match store.device_list(None).await {
        Ok(devices) => devices.into_iter().map(|d| (d.id, d)).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load connection endpoints");
            return;
        }
    };
    for conn in connections.iter_mut() {
        conn.source_device = devices.get(&conn.source_device_id).cloned();
        conn.target_device = devices.get(&conn.target_device_id).cloned();
    }
}

async fn load_endpoint(store: &dyn InventoryStore, id: DeviceId) -> Option<Device> {
    match store.device_get(id).await {
        Ok(device) => device,
        Err(e) => {
            tracing::warn!(device_id = %id, error = %e, "Could not load connection endpoint");
            None
        }
    }
}

pub async fn list_connections(store: &dyn InventoryStore) -> ApiResult<Vec<NetworkConnection>> {
    let mut connections = store.connection_list().await?;
    embed_all_endpoints(store, &mut connections).await;
    Ok(connections)
}

pub async fn get_connection(
    store: &dyn InventoryStore,
    id: ConnectionId,
) -> ApiResult<NetworkConnection> {
    let mut connection = store
        .connection_get(id)
        .await?
        .ok_or_else(|| ApiError::connection_not_found(id))?;
    connection.source_device = load_endpoint(store, connection.source_device_id).await;
    connection.target_device = load_endpoint(store, connection.target_device_id).await;
    Ok(connection)
}

/// Cable two existing devices together. A given `(source, target)` pair may
/// exist only once.
pub async fn create_connection(
    store: &dyn InventoryStore,
    req: CreateConnectionRequest,
) -> ApiResult<NetworkConnection> {
    req.validate()?;

    let source = store.device_get(req.source_device_id).await?.ok_or_else(|| {
        ApiError::device_not_found(req.source_device_id)
            .with_details(serde_json::json!({"field": "source_device_id"}))
    })?;
    let target = store.device_get(req.target_device_id).await?.ok_or_else(|| {
        ApiError::device_not_found(req.target_device_id)
            .with_details(serde_json::json!({"field": "target_device_id"}))
    })?;
    if store
        .connection_exists(req.source_device_id, req.target_device_id)
        .await?
    {
        return Err(ApiError::entity_already_exists(format!(
            "connection from device {} to device {} already exists",
            req.source_device_id, req.target_device_id
        )));
    }

    let mut created = store.connection_insert(&req.into_new_connection()).await?;
    tracing::info!(
        connection_id = %created.id,
        source = %created.source_device_id,
        target = %created.target_device_id,
        "Connection created"
    );
    created.source_device = Some(source);
    created.target_device = Some(target);
    Ok(created)
}

pub async fn delete_connection(store: &dyn InventoryStore, id: ConnectionId) -> ApiResult<()> {
    if !store.connection_delete(id).await? {
        return Err(ApiError::connection_not_found(id));
    }
    tracing::info!(connection_id = %id, "Connection deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use rackview_core::{
        DeviceSpecs, DeviceStatus, DeviceType, EntityIdType, NewDevice, NewRack,
    };
    use rackview_storage::MockStorage;

    async fn two_devices(store: &MockStorage) -> (DeviceId, DeviceId) {
        let rack = store
            .rack_insert(&NewRack {
                name: "r1".to_string(),
                description: String::new(),
                size_u: 42,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for top in [10, 20] {
            let device = store
                .device_insert(&NewDevice {
                    rack_id: rack.id,
                    name: format!("dev-{}", top),
                    icon: "🖥️".to_string(),
                    device_type: DeviceType::Network,
                    position_u: top,
                    size_u: 1,
                    status: DeviceStatus::Online,
                    model: String::new(),
                    ip_address: None,
                    health_check_url: None,
                    specs: DeviceSpecs::new(),
                })
                .await
                .unwrap();
            ids.push(device.id);
        }
        (ids[0], ids[1])
    }

    fn req(source: DeviceId, target: DeviceId) -> CreateConnectionRequest {
        CreateConnectionRequest {
            source_device_id: source,
            target_device_id: target,
            connection_type: "ethernet".to_string(),
            port_info: "eth0 -> ge-0/0/1".to_string(),
            speed: "10G".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_embeds_endpoints() {
        let store = MockStorage::new();
        let (a, b) = two_devices(&store).await;

        let conn = create_connection(&store, req(a, b)).await.unwrap();
        assert_eq!(conn.source_device.as_ref().map(|d| d.id), Some(a));
        assert_eq!(conn.target_device.as_ref().map(|d| d.id), Some(b));

        let listed = list_connections(&store).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].source_device.is_some());
    }

    #[tokio::test]
    async fn test_single_connection_paths_skip_device_listing() {
        let store = MockStorage::new();
        let (a, b) = two_devices(&store).await;

        let created = create_connection(&store, req(a, b)).await.unwrap();
        let fetched = get_connection(&store, created.id).await.unwrap();
        assert_eq!(fetched.source_device.as_ref().map(|d| d.id), Some(a));
        assert_eq!(fetched.target_device.as_ref().map(|d| d.id), Some(b));
        assert_eq!(store.device_list_calls(), 0);

        list_connections(&store).await.unwrap();
        assert_eq!(store.device_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_pair_conflicts_but_reverse_is_allowed() {
        let store = MockStorage::new();
        let (a, b) = two_devices(&store).await;
        create_connection(&store, req(a, b)).await.unwrap();

        let err = create_connection(&store, req(a, b)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EntityAlreadyExists);

        assert!(create_connection(&store, req(b, a)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_endpoint_and_self_connection() {
        let store = MockStorage::new();
        let (a, _) = two_devices(&store).await;

        let err = create_connection(&store, req(a, DeviceId::new(404)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DeviceNotFound);
        assert_eq!(
            err.details,
            Some(serde_json::json!({"field": "target_device_id"}))
        );

        let err = create_connection(&store, req(a, a)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_connection() {
        let store = MockStorage::new();
        let err = get_connection(&store, ConnectionId::new(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionNotFound);
        let err = delete_connection(&store, ConnectionId::new(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConnectionNotFound);
    }
}
