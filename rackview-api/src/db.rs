//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling with deadpool-postgres and the
//! `InventoryStore` implementation backing the REST API.
//!
//! Every statement is fixed text with positional parameters. Partial updates
//! are applied read-modify-write by the services and written back as a full row.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolError, RecyclingMethod, Runtime};
use rackview_core::{
    ConnectionId, Device, DeviceId, DeviceSpecs, DeviceStatus, DeviceType, EntityIdType,
    EntityType, MountedDevice, NetworkConnection, NewConnection, NewDevice, NewRack, Rack,
    RackId, StorageError, StorageResult,
};
use rackview_storage::{DeviceLookup, InventoryStore};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::FromSql;
use tokio_postgres::{NoTls, Row};

use crate::error::{ApiError, ApiResult};
use crate::migrations;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait/create/recycle timeout for pooled connections
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "rackview".to_string(),
            user: "rackview".to_string(),
            password: "rackview".to_string(),
            max_size: 25,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("RACKVIEW_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("RACKVIEW_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("RACKVIEW_DB_NAME").unwrap_or_else(|_| "rackview".to_string()),
            user: std::env::var("RACKVIEW_DB_USER").unwrap_or_else(|_| "rackview".to_string()),
            password: std::env::var("RACKVIEW_DB_PASSWORD")
                .unwrap_or_else(|_| "rackview".to_string()),
            max_size: std::env::var("RACKVIEW_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(25),
            timeout: Duration::from_secs(
                std::env::var("RACKVIEW_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        pool_cfg.timeouts.recycle = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

/// Map a SQLSTATE raised while writing `entity_type` onto the storage taxonomy.
///
/// The span exclusion constraint raises `23P01`, which surfaces as a device
/// conflict exactly like a failed application-level overlap check.
pub fn classify_sqlstate(entity_type: EntityType, code: &SqlState, message: &str) -> StorageError {
    if *code == SqlState::EXCLUSION_VIOLATION || *code == SqlState::UNIQUE_VIOLATION {
        StorageError::Conflict {
            entity_type,
            reason: message.to_string(),
        }
    } else if *code == SqlState::FOREIGN_KEY_VIOLATION {
        StorageError::MissingReference {
            entity_type,
            reason: message.to_string(),
        }
    } else {
        StorageError::Backend {
            reason: format!("{}: {}", code.code(), message),
        }
    }
}

fn db_err(entity_type: EntityType) -> impl Fn(tokio_postgres::Error) -> StorageError {
    move |err| {
        if let Some(db) = err.as_db_error() {
            return classify_sqlstate(entity_type, db.code(), db.message());
        }
        if err.is_closed() {
            return StorageError::Unavailable {
                reason: "database connection closed".to_string(),
            };
        }
        tracing::error!(entity = %entity_type, error = ?err, "Database error");
        StorageError::Backend {
            reason: err.to_string(),
        }
    }
}

fn pool_err(err: PoolError) -> StorageError {
    tracing::error!(error = ?err, "Connection pool error");
    match err {
        PoolError::Timeout(_) => StorageError::Unavailable {
            reason: "connection pool exhausted".to_string(),
        },
        PoolError::Closed => StorageError::Unavailable {
            reason: "connection pool closed".to_string(),
        },
        other => StorageError::Backend {
            reason: other.to_string(),
        },
    }
}

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> StorageResult<T> {
    row.try_get(name).map_err(|e| StorageError::Backend {
        reason: format!("failed to decode column {}: {}", name, e),
    })
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const RACK_COLUMNS: &str = "id, name, description, size_u, created_at, updated_at";

const DEVICE_COLUMNS: &str = "id, rack_id, name, icon, type, position_u, size_u, status, model, \
     ip_address, health_check_url, created_at, updated_at";

const CONNECTION_COLUMNS: &str =
    "id, source_device_id, target_device_id, connection_type, port_info, speed, created_at";

fn rack_from_row(row: &Row) -> StorageResult<Rack> {
    Ok(Rack {
        id: RackId::new(column(row, "id")?),
        name: column(row, "name")?,
        description: column(row, "description")?,
        size_u: column(row, "size_u")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        devices: None,
    })
}

fn device_from_row(row: &Row) -> StorageResult<Device> {
    let device_type: String = column(row, "type")?;
    let status: String = column(row, "status")?;
    Ok(Device {
        id: DeviceId::new(column(row, "id")?),
        rack_id: RackId::new(column(row, "rack_id")?),
        name: column(row, "name")?,
        icon: column(row, "icon")?,
        device_type: DeviceType::from_db_str(&device_type).map_err(|e| StorageError::Backend {
            reason: e.to_string(),
        })?,
        position_u: column(row, "position_u")?,
        size_u: column(row, "size_u")?,
        status: DeviceStatus::from_db_str(&status).map_err(|e| StorageError::Backend {
            reason: e.to_string(),
        })?,
        model: column(row, "model")?,
        ip_address: column(row, "ip_address")?,
        health_check_url: column(row, "health_check_url")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        specs: DeviceSpecs::new(),
    })
}

fn connection_from_row(row: &Row) -> StorageResult<NetworkConnection> {
    Ok(NetworkConnection {
        id: ConnectionId::new(column(row, "id")?),
        source_device_id: DeviceId::new(column(row, "source_device_id")?),
        target_device_id: DeviceId::new(column(row, "target_device_id")?),
        connection_type: column(row, "connection_type")?,
        port_info: column(row, "port_info")?,
        speed: column(row, "speed")?,
        created_at: column(row, "created_at")?,
        source_device: None,
        target_device: None,
    })
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        let status = self.pool.status();
        status.size
    }

    /// Stop handing out connections and drop idle ones.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StorageResult<Object> {
        self.pool.get().await.map_err(pool_err)
    }

    /// Bring the schema up to date.
    pub async fn run_migrations(&self) -> ApiResult<()> {
        let mut conn = self.get_conn().await?;
        let applied = migrations::apply_pending(&mut conn).await?;
        tracing::info!(applied = applied.len(), "Schema is up to date");
        Ok(())
    }

    /// Attach specs to each device with a single query.
    async fn load_specs(&self, conn: &Object, devices: &mut [Device]) -> StorageResult<()> {
        if devices.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = devices.iter().map(|d| d.id.as_i32()).collect();
        let rows = conn
            .query(
                "SELECT device_id, spec_key, spec_value FROM device_specs \
                 WHERE device_id = ANY($1)",
                &[&ids],
            )
            .await
            .map_err(db_err(EntityType::DeviceSpec))?;

        let mut by_device: HashMap<i32, DeviceSpecs> = HashMap::new();
        for row in &rows {
            let device_id: i32 = column(row, "device_id")?;
            by_device
                .entry(device_id)
                .or_default()
                .insert(column(row, "spec_key")?, column(row, "spec_value")?);
        }
        for device in devices.iter_mut() {
            if let Some(specs) = by_device.remove(&device.id.as_i32()) {
                device.specs = specs;
            }
        }
        Ok(())
    }
}

/// Replace all spec rows of a device inside an open transaction.
async fn replace_specs(
    tx: &deadpool_postgres::Transaction<'_>,
    device_id: DeviceId,
    specs: &DeviceSpecs,
) -> StorageResult<()> {
    let id = device_id.as_i32();
    tx.execute("DELETE FROM device_specs WHERE device_id = $1", &[&id])
        .await
        .map_err(db_err(EntityType::DeviceSpec))?;
    for (key, value) in specs {
        tx.execute(
            "INSERT INTO device_specs (device_id, spec_key, spec_value) VALUES ($1, $2, $3)",
            &[&id, key, value],
        )
        .await
        .map_err(db_err(EntityType::DeviceSpec))?;
    }
    Ok(())
}

#[async_trait]
impl DeviceLookup for DbClient {
    async fn rack_size_u(&self, rack_id: RackId) -> StorageResult<Option<i32>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt("SELECT size_u FROM racks WHERE id = $1", &[&rack_id.as_i32()])
            .await
            .map_err(db_err(EntityType::Rack))?;
        row.map(|r| column(&r, "size_u")).transpose()
    }

    async fn devices_in_rack(&self, rack_id: RackId) -> StorageResult<Vec<MountedDevice>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT id, position_u, size_u FROM devices WHERE rack_id = $1",
                &[&rack_id.as_i32()],
            )
            .await
            .map_err(db_err(EntityType::Device))?;
        rows.iter()
            .map(|row| {
                Ok(MountedDevice {
                    id: DeviceId::new(column(row, "id")?),
                    top: column(row, "position_u")?,
                    height: column(row, "size_u")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl InventoryStore for DbClient {
    async fn ping(&self) -> StorageResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(db_err(EntityType::Rack))?;
        Ok(())
    }

    // ========================================================================
    // RACK OPERATIONS
    // ========================================================================

    async fn rack_list(&self) -> StorageResult<Vec<Rack>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("SELECT {} FROM racks ORDER BY id", RACK_COLUMNS),
                &[],
            )
            .await
            .map_err(db_err(EntityType::Rack))?;
        rows.iter().map(rack_from_row).collect()
    }

    async fn rack_get(&self, id: RackId) -> StorageResult<Option<Rack>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM racks WHERE id = $1", RACK_COLUMNS),
                &[&id.as_i32()],
            )
            .await
            .map_err(db_err(EntityType::Rack))?;
        row.as_ref().map(rack_from_row).transpose()
    }

    async fn rack_insert(&self, rack: &NewRack) -> StorageResult<Rack> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO racks (name, description, size_u) VALUES ($1, $2, $3) \
                     RETURNING {}",
                    RACK_COLUMNS
                ),
                &[&rack.name, &rack.description, &rack.size_u],
            )
            .await
            .map_err(db_err(EntityType::Rack))?;
        rack_from_row(&row)
    }

    async fn rack_update(&self, rack: &Rack) -> StorageResult<Rack> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE racks SET name = $2, description = $3, size_u = $4, \
                     updated_at = NOW() WHERE id = $1 RETURNING {}",
                    RACK_COLUMNS
                ),
                &[&rack.id.as_i32(), &rack.name, &rack.description, &rack.size_u],
            )
            .await
            .map_err(db_err(EntityType::Rack))?;
        match row {
            Some(row) => rack_from_row(&row),
            None => Err(StorageError::NotFound {
                entity_type: EntityType::Rack,
                id: rack.id.as_i32(),
            }),
        }
    }

    async fn rack_delete(&self, id: RackId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM racks WHERE id = $1", &[&id.as_i32()])
            .await
            .map_err(db_err(EntityType::Rack))?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // DEVICE OPERATIONS
    // ========================================================================

    async fn device_list(&self, rack_id: Option<RackId>) -> StorageResult<Vec<Device>> {
        let conn = self.get_conn().await?;
        let rows = match rack_id {
            Some(rack_id) => {
                conn.query(
                    &format!(
                        "SELECT {} FROM devices WHERE rack_id = $1 ORDER BY position_u DESC",
                        DEVICE_COLUMNS
                    ),
                    &[&rack_id.as_i32()],
                )
                .await
            }
            None => {
                conn.query(
                    &format!(
                        "SELECT {} FROM devices ORDER BY rack_id, position_u DESC",
                        DEVICE_COLUMNS
                    ),
                    &[],
                )
                .await
            }
        }
        .map_err(db_err(EntityType::Device))?;

        let mut devices = rows
            .iter()
            .map(device_from_row)
            .collect::<StorageResult<Vec<_>>>()?;
        self.load_specs(&conn, &mut devices).await?;
        Ok(devices)
    }

    async fn device_get(&self, id: DeviceId) -> StorageResult<Option<Device>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM devices WHERE id = $1", DEVICE_COLUMNS),
                &[&id.as_i32()],
            )
            .await
            .map_err(db_err(EntityType::Device))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut devices = [device_from_row(&row)?];
        self.load_specs(&conn, &mut devices).await?;
        let [device] = devices;
        Ok(Some(device))
    }

    async fn device_insert(&self, device: &NewDevice) -> StorageResult<Device> {
        let mut conn = self.get_conn().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(db_err(EntityType::Device))?;

        let device_type = device.device_type.as_db_str();
        let status = device.status.as_db_str();
        let row = tx
            .query_one(
                &format!(
                    "INSERT INTO devices (rack_id, name, icon, type, position_u, size_u, \
                     status, model, ip_address, health_check_url) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
                    DEVICE_COLUMNS
                ),
                &[
                    &device.rack_id.as_i32(),
                    &device.name,
                    &device.icon,
                    &device_type,
                    &device.position_u,
                    &device.size_u,
                    &status,
                    &device.model,
                    &device.ip_address,
                    &device.health_check_url,
                ],
            )
            .await
            .map_err(db_err(EntityType::Device))?;
        let mut created = device_from_row(&row)?;

        replace_specs(&tx, created.id, &device.specs).await?;
        tx.commit().await.map_err(db_err(EntityType::Device))?;

        created.specs = device.specs.clone();
        tracing::debug!(device_id = %created.id, rack_id = %created.rack_id, "Device inserted");
        Ok(created)
    }

    async fn device_update(&self, device: &Device) -> StorageResult<Device> {
        let mut conn = self.get_conn().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(db_err(EntityType::Device))?;

        let device_type = device.device_type.as_db_str();
        let status = device.status.as_db_str();
        let row = tx
            .query_opt(
                &format!(
                    "UPDATE devices SET name = $2, icon = $3, type = $4, position_u = $5, \
                     size_u = $6, status = $7, model = $8, ip_address = $9, \
                     health_check_url = $10, updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    DEVICE_COLUMNS
                ),
                &[
                    &device.id.as_i32(),
                    &device.name,
                    &device.icon,
                    &device_type,
                    &device.position_u,
                    &device.size_u,
                    &status,
                    &device.model,
                    &device.ip_address,
                    &device.health_check_url,
                ],
            )
            .await
            .map_err(db_err(EntityType::Device))?;
        let Some(row) = row else {
            return Err(StorageError::NotFound {
                entity_type: EntityType::Device,
                id: device.id.as_i32(),
            });
        };
        let mut updated = device_from_row(&row)?;

        replace_specs(&tx, updated.id, &device.specs).await?;
        tx.commit().await.map_err(db_err(EntityType::Device))?;

        updated.specs = device.specs.clone();
        Ok(updated)
    }

    async fn device_set_status(&self, id: DeviceId, status: DeviceStatus) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute(
                "UPDATE devices SET status = $2, updated_at = NOW() WHERE id = $1",
                &[&id.as_i32(), &status.as_db_str()],
            )
            .await
            .map_err(db_err(EntityType::Device))?;
        Ok(updated > 0)
    }

    async fn device_delete(&self, id: DeviceId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM devices WHERE id = $1", &[&id.as_i32()])
            .await
            .map_err(db_err(EntityType::Device))?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // CONNECTION OPERATIONS
    // ========================================================================

    async fn connection_list(&self) -> StorageResult<Vec<NetworkConnection>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM network_connections ORDER BY id",
                    CONNECTION_COLUMNS
                ),
                &[],
            )
            .await
            .map_err(db_err(EntityType::Connection))?;
        rows.iter().map(connection_from_row).collect()
    }

    async fn connection_get(&self, id: ConnectionId) -> StorageResult<Option<NetworkConnection>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT {} FROM network_connections WHERE id = $1",
                    CONNECTION_COLUMNS
                ),
                &[&id.as_i32()],
            )
            .await
            .map_err(db_err(EntityType::Connection))?;
        row.as_ref().map(connection_from_row).transpose()
    }

    async fn connection_exists(&self, source: DeviceId, target: DeviceId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM network_connections \
                 WHERE source_device_id = $1 AND target_device_id = $2)",
                &[&source.as_i32(), &target.as_i32()],
            )
            .await
            .map_err(db_err(EntityType::Connection))?;
        row.try_get(0).map_err(|e| StorageError::Backend {
            reason: e.to_string(),
        })
    }

    async fn connection_insert(
        &self,
        connection: &NewConnection,
    ) -> StorageResult<NetworkConnection> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO network_connections \
                     (source_device_id, target_device_id, connection_type, port_info, speed) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    CONNECTION_COLUMNS
                ),
                &[
                    &connection.source_device_id.as_i32(),
                    &connection.target_device_id.as_i32(),
                    &connection.connection_type,
                    &connection.port_info,
                    &connection.speed,
                ],
            )
            .await
            .map_err(db_err(EntityType::Connection))?;
        connection_from_row(&row)
    }

    async fn connection_delete(&self, id: ConnectionId) -> StorageResult<bool> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM network_connections WHERE id = $1", &[&id.as_i32()])
            .await
            .map_err(db_err(EntityType::Connection))?;
        Ok(deleted > 0)
    }
}
