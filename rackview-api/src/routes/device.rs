//! Device REST API Routes
//!
//! Creating, moving, or resizing a device validates its placement in the
//! rack first; see `services::device_service`.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rackview_core::DeviceId;
use rackview_storage::InventoryStore;
use std::sync::Arc;

use crate::{
    error::ApiResult,
    extractors::{ApiJson, ApiQuery, PathId},
    services::{self, HealthProbe},
    types::{CreateDeviceRequest, ListDevicesParams, MessageResponse, UpdateDeviceRequest},
};
#[cfg(feature = "openapi")]
use crate::{error::ApiError, types::HealthCheckResult};
#[cfg(feature = "openapi")]
use rackview_core::Device;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for device routes.
#[derive(Clone)]
pub struct DeviceState {
    pub store: Arc<dyn InventoryStore>,
    pub probe: HealthProbe,
}

impl DeviceState {
    pub fn new(store: Arc<dyn InventoryStore>, probe: HealthProbe) -> Self {
        Self { store, probe }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/devices - List devices, optionally for one rack
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/devices",
    tag = "Devices",
    params(ListDevicesParams),
    responses(
        (status = 200, description = "Devices ordered top to bottom", body = Vec<Device>),
        (status = 500, description = "Internal server error", body = ApiError),
    ),
))]
pub async fn list_devices(
    State(state): State<Arc<DeviceState>>,
    ApiQuery(params): ApiQuery<ListDevicesParams>,
) -> ApiResult<impl IntoResponse> {
    let devices = services::list_devices(state.store.as_ref(), params.rack_id()).await?;
    Ok(Json(devices))
}

/// GET /api/devices/{id} - Get a device
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(
        ("id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Device details", body = Device),
        (status = 400, description = "Invalid device ID", body = ApiError),
        (status = 404, description = "Device not found", body = ApiError),
    ),
))]
pub async fn get_device(
    State(state): State<Arc<DeviceState>>,
    PathId(id): PathId<DeviceId>,
) -> ApiResult<impl IntoResponse> {
    let device = services::get_device(state.store.as_ref(), id).await?;
    Ok(Json(device))
}

/// POST /api/devices - Mount a new device
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/devices",
    tag = "Devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Invalid request or placement outside the rack", body = ApiError),
        (status = 404, description = "Rack not found", body = ApiError),
        (status = 409, description = "Placement overlaps another device", body = ApiError),
    ),
))]
pub async fn create_device(
    State(state): State<Arc<DeviceState>>,
    ApiJson(req): ApiJson<CreateDeviceRequest>,
) -> ApiResult<impl IntoResponse> {
    let device = services::create_device(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// PUT /api/devices/{id} - Update a device
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(
        ("id" = i32, Path, description = "Device ID")
    ),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 400, description = "Invalid request or placement outside the rack", body = ApiError),
        (status = 404, description = "Device not found", body = ApiError),
        (status = 409, description = "Placement overlaps another device", body = ApiError),
    ),
))]
pub async fn update_device(
    State(state): State<Arc<DeviceState>>,
    PathId(id): PathId<DeviceId>,
    ApiJson(req): ApiJson<UpdateDeviceRequest>,
) -> ApiResult<impl IntoResponse> {
    let device = services::update_device(state.store.as_ref(), id, req).await?;
    Ok(Json(device))
}

/// DELETE /api/devices/{id} - Delete a device
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/devices/{id}",
    tag = "Devices",
    params(
        ("id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Device deleted", body = MessageResponse),
        (status = 404, description = "Device not found", body = ApiError),
    ),
))]
pub async fn delete_device(
    State(state): State<Arc<DeviceState>>,
    PathId(id): PathId<DeviceId>,
) -> ApiResult<impl IntoResponse> {
    services::delete_device(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("device deleted successfully")))
}

/// POST /api/devices/{id}/health-check - Probe a device and record its status
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/devices/{id}/health-check",
    tag = "Devices",
    params(
        ("id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 200, description = "Probe result", body = HealthCheckResult),
        (status = 404, description = "Device not found", body = ApiError),
    ),
))]
pub async fn check_device_health(
    State(state): State<Arc<DeviceState>>,
    PathId(id): PathId<DeviceId>,
) -> ApiResult<impl IntoResponse> {
    let result = services::check_device_health(state.store.as_ref(), &state.probe, id).await?;
    Ok(Json(result))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the device routes router.
pub fn create_router(store: Arc<dyn InventoryStore>, probe: HealthProbe) -> Router {
    let state = Arc::new(DeviceState::new(store, probe));

    Router::new()
        .route("/", get(list_devices).post(create_device))
        .route(
            "/:id",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/:id/health-check", post(check_device_health))
        .with_state(state)
}
