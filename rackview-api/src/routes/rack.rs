//! Rack REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rackview_core::RackId;
use rackview_storage::InventoryStore;
use std::sync::Arc;

use crate::{
    error::ApiResult,
    extractors::{ApiJson, PathId},
    services,
    types::{CreateRackRequest, MessageResponse, UpdateRackRequest},
};
#[cfg(feature = "openapi")]
use crate::error::ApiError;
#[cfg(feature = "openapi")]
use rackview_core::Rack;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for rack routes.
#[derive(Clone)]
pub struct RackState {
    pub store: Arc<dyn InventoryStore>,
}

impl RackState {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/racks - List racks
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/racks",
    tag = "Racks",
    responses(
        (status = 200, description = "List of racks", body = Vec<Rack>),
        (status = 500, description = "Internal server error", body = ApiError),
    ),
))]
pub async fn list_racks(State(state): State<Arc<RackState>>) -> ApiResult<impl IntoResponse> {
    let racks = services::list_racks(state.store.as_ref()).await?;
    Ok(Json(racks))
}

/// GET /api/racks/{id} - Get a rack with its devices
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/racks/{id}",
    tag = "Racks",
    params(
        ("id" = i32, Path, description = "Rack ID")
    ),
    responses(
        (status = 200, description = "Rack with mounted devices", body = Rack),
        (status = 400, description = "Invalid rack ID", body = ApiError),
        (status = 404, description = "Rack not found", body = ApiError),
    ),
))]
pub async fn get_rack(
    State(state): State<Arc<RackState>>,
    PathId(id): PathId<RackId>,
) -> ApiResult<impl IntoResponse> {
    let rack = services::get_rack(state.store.as_ref(), id).await?;
    Ok(Json(rack))
}

/// POST /api/racks - Create a rack
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/racks",
    tag = "Racks",
    request_body = CreateRackRequest,
    responses(
        (status = 201, description = "Rack created", body = Rack),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
))]
pub async fn create_rack(
    State(state): State<Arc<RackState>>,
    ApiJson(req): ApiJson<CreateRackRequest>,
) -> ApiResult<impl IntoResponse> {
    let rack = services::create_rack(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(rack)))
}

/// PUT /api/racks/{id} - Update a rack
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/racks/{id}",
    tag = "Racks",
    params(
        ("id" = i32, Path, description = "Rack ID")
    ),
    request_body = UpdateRackRequest,
    responses(
        (status = 200, description = "Rack updated", body = Rack),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Rack not found", body = ApiError),
        (status = 409, description = "Rack would be smaller than a mounted device", body = ApiError),
    ),
))]
pub async fn update_rack(
    State(state): State<Arc<RackState>>,
    PathId(id): PathId<RackId>,
    ApiJson(req): ApiJson<UpdateRackRequest>,
) -> ApiResult<impl IntoResponse> {
    let rack = services::update_rack(state.store.as_ref(), id, req).await?;
    Ok(Json(rack))
}

/// DELETE /api/racks/{id} - Delete a rack and everything in it
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/racks/{id}",
    tag = "Racks",
    params(
        ("id" = i32, Path, description = "Rack ID")
    ),
    responses(
        (status = 200, description = "Rack deleted", body = MessageResponse),
        (status = 404, description = "Rack not found", body = ApiError),
    ),
))]
pub async fn delete_rack(
    State(state): State<Arc<RackState>>,
    PathId(id): PathId<RackId>,
) -> ApiResult<impl IntoResponse> {
    services::delete_rack(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("rack deleted successfully")))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the rack routes router.
pub fn create_router(store: Arc<dyn InventoryStore>) -> Router {
    let state = Arc::new(RackState::new(store));

    Router::new()
        .route("/", get(list_racks).post(create_rack))
        .route("/:id", get(get_rack).put(update_rack).delete(delete_rack))
        .with_state(state)
}
