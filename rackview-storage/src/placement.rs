//! Composite placement validation over a `DeviceLookup`.
//!
//! The sibling snapshot is read fresh on every call. Nothing here holds a
//! lock between the check and the caller's write; the store's own overlap
//! guard catches a concurrent writer that slips in between.

use rackview_core::{
    overlaps_any, validate_bounds, DeviceId, PlacementError, PlacementResult, RackId,
    RackUnitSpan, StorageResult,
};

use crate::DeviceLookup;

/// Whether a device of `height` units at `top` would collide with any device
/// already in `rack_id`, ignoring `exclude` (the device being updated).
pub async fn check_overlap<L>(
    lookup: &L,
    rack_id: RackId,
    top: i32,
    height: i32,
    exclude: Option<DeviceId>,
) -> StorageResult<bool>
where
    L: DeviceLookup + ?Sized,
{
    let candidate = RackUnitSpan::from_top_and_height(top, height);
    let siblings = lookup.devices_in_rack(rack_id).await?;
    Ok(overlaps_any(&candidate, &siblings, exclude))
}

/// Validate a placement before a device row is written.
///
/// Checks, in order: the rack exists, the span fits inside the rack, and the
/// span does not overlap another device in the rack.
pub async fn validate_placement<L>(
    lookup: &L,
    rack_id: RackId,
    top: i32,
    height: i32,
    exclude: Option<DeviceId>,
) -> PlacementResult<RackUnitSpan>
where
    L: DeviceLookup + ?Sized,
{
    let rack_size_u = lookup
        .rack_size_u(rack_id)
        .await?
        .ok_or(PlacementError::RackNotFound { rack_id })?;

    let span = validate_bounds(rack_size_u, top, height)?;

    if check_overlap(lookup, rack_id, top, height, exclude).await? {
        tracing::debug!(
            %rack_id,
            top,
            height,
            exclude = ?exclude,
            "placement rejected: overlaps existing device"
        );
        return Err(PlacementError::PlacementConflict { rack_id });
    }

    Ok(span)
}
