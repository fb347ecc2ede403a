//! Embedded schema migrations.
//!
//! Each migration runs inside its own transaction and is recorded in
//! `schema_migrations`, so re-running on an up-to-date database is a no-op.

use deadpool_postgres::Object;

use crate::error::{ApiError, ApiResult};

/// A named SQL script compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: &'static str,
    pub sql: &'static str,
}

/// All migrations in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_initial_schema",
        sql: include_str!("../migrations/0001_initial_schema.sql"),
    },
    Migration {
        version: "0002_device_span_exclusion",
        sql: include_str!("../migrations/0002_device_span_exclusion.sql"),
    },
];

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version    TEXT PRIMARY KEY,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

fn migration_error(version: &str, err: tokio_postgres::Error) -> ApiError {
    tracing::error!(version, error = ?err, "Migration failed");
    ApiError::database_error(format!("Migration {} failed", version))
}

/// Apply every migration not yet recorded. Returns the versions applied.
pub async fn apply_pending(conn: &mut Object) -> ApiResult<Vec<&'static str>> {
    conn.batch_execute(CREATE_LEDGER)
        .await
        .map_err(|e| migration_error("schema_migrations", e))?;

    let mut applied = Vec::new();
    for migration in MIGRATIONS {
        let done = conn
            .query_opt(
                "SELECT 1 FROM schema_migrations WHERE version = $1",
                &[&migration.version],
            )
            .await
            .map_err(|e| migration_error(migration.version, e))?
            .is_some();
        if done {
            continue;
        }

        let tx = conn
            .transaction()
            .await
            .map_err(|e| migration_error(migration.version, e))?;
        tx.batch_execute(migration.sql)
            .await
            .map_err(|e| migration_error(migration.version, e))?;
        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES ($1)",
            &[&migration.version],
        )
        .await
        .map_err(|e| migration_error(migration.version, e))?;
        tx.commit()
            .await
            .map_err(|e| migration_error(migration.version, e))?;

        tracing::info!(version = migration.version, "Applied migration");
        applied.push(migration.version);
    }

    Ok(applied)
}
