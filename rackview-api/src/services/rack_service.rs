//! Rack Service

use rackview_core::{Rack, RackId};
use rackview_storage::InventoryStore;

use crate::error::{ApiError, ApiResult};
use crate::types::{CreateRackRequest, UpdateRackRequest};

pub async fn list_racks(store: &dyn InventoryStore) -> ApiResult<Vec<Rack>> {
    Ok(store.rack_list().await?)
}

/// Get a rack with its devices, top to bottom.
pub async fn get_rack(store: &dyn InventoryStore, id: RackId) -> ApiResult<Rack> {
    let mut rack = store
        .rack_get(id)
        .await?
        .ok_or_else(|| ApiError::rack_not_found(id))?;
    rack.devices = Some(store.device_list(Some(id)).await?);
    Ok(rack)
}

pub async fn create_rack(store: &dyn InventoryStore, req: CreateRackRequest) -> ApiResult<Rack> {
    req.validate()?;
    let rack = store.rack_insert(&req.into_new_rack()).await?;
    tracing::info!(rack_id = %rack.id, size_u = rack.size_u, "Rack created");
    Ok(rack)
}

/// Apply a partial update.
///
/// A rack cannot shrink below the top unit of its highest mounted device.
pub async fn update_rack(
    store: &dyn InventoryStore,
    id: RackId,
    req: UpdateRackRequest,
) -> ApiResult<Rack> {
    let patch = req.into_patch()?;
    let mut rack = store
        .rack_get(id)
        .await?
        .ok_or_else(|| ApiError::rack_not_found(id))?;

    if patch.is_empty() {
        return Ok(rack);
    }

    if let Some(new_size) = patch.size_u.filter(|size| *size < rack.size_u) {
        let highest = store
            .devices_in_rack(id)
            .await?
            .iter()
            .map(|d| d.top)
            .max();
        if let Some(highest) = highest.filter(|top| *top > new_size) {
            return Err(ApiError::state_conflict(format!(
                "cannot shrink rack {} to {}U: a device occupies unit {}",
                id, new_size, highest
            ))
            .with_details(serde_json::json!({
                "size_u": new_size,
                "highest_occupied_u": highest,
            })));
        }
    }

    patch.apply_to(&mut rack);
    let updated = store.rack_update(&rack).await?;
    tracing::info!(rack_id = %id, "Rack updated");
    Ok(updated)
}

/// Delete a rack along with its devices and their connections.
pub async fn delete_rack(store: &dyn InventoryStore, id: RackId) -> ApiResult<()> {
    if !store.rack_delete(id).await? {
        return Err(ApiError::rack_not_found(id));
    }
    tracing::info!(rack_id = %id, "Rack deleted");
    Ok(())
}
