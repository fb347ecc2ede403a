//! Network Connection REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rackview_core::ConnectionId;
use rackview_storage::InventoryStore;
use std::sync::Arc;

use crate::{
    error::ApiResult,
    extractors::{ApiJson, PathId},
    services,
    types::{CreateConnectionRequest, MessageResponse},
};
#[cfg(feature = "openapi")]
use crate::error::ApiError;
#[cfg(feature = "openapi")]
use rackview_core::NetworkConnection;

/// Shared application state for connection routes.
#[derive(Clone)]
pub struct ConnectionState {
    pub store: Arc<dyn InventoryStore>,
}

impl ConnectionState {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }
}

/// GET /api/network/connections - List connections
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/network/connections",
    tag = "Network",
    responses(
        (status = 200, description = "Connections with endpoint devices", body = Vec<NetworkConnection>),
        (status = 500, description = "Internal server error", body = ApiError),
    ),
))]
pub async fn list_connections(
    State(state): State<Arc<ConnectionState>>,
) -> ApiResult<impl IntoResponse> {
    let connections = services::list_connections(state.store.as_ref()).await?;
    Ok(Json(connections))
}

/// GET /api/network/connections/{id} - Get a connection
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/network/connections/{id}",
    tag = "Network",
    params(
        ("id" = i32, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Connection details", body = NetworkConnection),
        (status = 400, description = "Invalid connection ID", body = ApiError),
        (status = 404, description = "Connection not found", body = ApiError),
    ),
))]
pub async fn get_connection(
    State(state): State<Arc<ConnectionState>>,
    PathId(id): PathId<ConnectionId>,
) -> ApiResult<impl IntoResponse> {
    let connection = services::get_connection(state.store.as_ref(), id).await?;
    Ok(Json(connection))
}

/// POST /api/network/connections - Cable two devices together
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/network/connections",
    tag = "Network",
    request_body = CreateConnectionRequest,
    responses(
        (status = 201, description = "Connection created", body = NetworkConnection),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Source or target device not found", body = ApiError),
        (status = 409, description = "Connection already exists", body = ApiError),
    ),
))]
pub async fn create_connection(
    State(state): State<Arc<ConnectionState>>,
    ApiJson(req): ApiJson<CreateConnectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let connection = services::create_connection(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(connection)))
}

/// DELETE /api/network/connections/{id} - Remove a connection
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/network/connections/{id}",
    tag = "Network",
    params(
        ("id" = i32, Path, description = "Connection ID")
    ),
    responses(
        (status = 200, description = "Connection deleted", body = MessageResponse),
        (status = 404, description = "Connection not found", body = ApiError),
    ),
))]
pub async fn delete_connection(
    State(state): State<Arc<ConnectionState>>,
    PathId(id): PathId<ConnectionId>,
) -> ApiResult<impl IntoResponse> {
    services::delete_connection(state.store.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("connection deleted successfully")))
}

/// Create the connection routes router.
pub fn create_router(store: Arc<dyn InventoryStore>) -> Router {
    let state = Arc::new(ConnectionState::new(store));

    Router::new()
        .route("/", get(list_connections).post(create_connection))
        .route("/:id", get(get_connection).delete(delete_connection))
        .with_state(state)
}
