//! Service Health Endpoints
//!
//! These report on the API process and its storage, not on rack hardware
//! (device checks live under `POST /api/devices/{id}/health-check`).
//!
//! - `/health/ping` answers "pong" without touching storage
//! - `/health/live` answers 204 while the process can serve requests
//! - `/health/ready` times one storage round-trip and answers 503 if it fails

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use rackview_storage::InventoryStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Whether the service should receive traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady,
}

/// Outcome of a single `InventoryStore::ping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StorageCheck {
    pub reachable: bool,
    /// Time until the store answered or failed.
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StorageCheck {
    pub async fn run(store: &dyn InventoryStore) -> Self {
        let started = Instant::now();
        let outcome = store.ping().await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(()) => Self {
                reachable: true,
                latency_ms,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, latency_ms, "storage readiness check failed");
                Self {
                    reachable: false,
                    latency_ms,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Body of `GET /health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadinessReport {
    pub status: Readiness,
    pub storage: StorageCheck,
}

impl ReadinessReport {
    pub fn from_storage(storage: StorageCheck) -> Self {
        let status = if storage.reachable {
            Readiness::Ready
        } else {
            Readiness::NotReady
        };
        Self { status, storage }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            Readiness::Ready => StatusCode::OK,
            Readiness::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// GET /health/ping
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
))]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 204, description = "Process is alive"),
    ),
))]
pub async fn liveness() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /health/ready
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Storage answered", body = ReadinessReport),
        (status = 503, description = "Storage did not answer", body = ReadinessReport),
    ),
))]
pub async fn readiness(State(store): State<Arc<dyn InventoryStore>>) -> impl IntoResponse {
    let report = ReadinessReport::from_storage(StorageCheck::run(store.as_ref()).await);
    (report.status_code(), Json(report))
}

/// Routes mounted under `/health`.
pub fn create_router(store: Arc<dyn InventoryStore>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(store)
}
