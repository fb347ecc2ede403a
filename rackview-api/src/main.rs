//! RackView API Server Entry Point
//!
//! Bootstraps configuration, connects to PostgreSQL, applies migrations, and
//! starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use rackview_api::telemetry::{init_tracing, TelemetryConfig};
use rackview_api::{create_api_router, resolve_bind_addr, ApiConfig, ApiError, ApiResult, DbClient, DbConfig};
use rackview_storage::InventoryStore;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;
    db.run_migrations().await?;
    tracing::info!(
        host = %db_config.host,
        dbname = %db_config.dbname,
        pool_size = db.pool_size(),
        "Database ready"
    );

    let api_config = ApiConfig::from_env();
    let store: Arc<dyn InventoryStore> = Arc::new(db.clone());
    let app: Router = create_api_router(store, &api_config)?;

    let addr = resolve_bind_addr(|key| std::env::var(key).ok())?;
    tracing::info!(%addr, "Starting RackView API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    db.close();
    Ok(())
}
