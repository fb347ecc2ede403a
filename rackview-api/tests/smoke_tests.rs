#![cfg(feature = "db-tests")]
//! End-to-end smoke tests against PostgreSQL.
//!
//! Needs a reachable database configured through the `RACKVIEW_DB_*`
//! variables; run with `--features db-tests`.

use rackview_api::{ApiError, ApiResult, DbClient, DbConfig};
use rackview_core::*;
use rackview_storage::{validate_placement, InventoryStore};
use rackview_test_utils::fixtures;

async fn test_db() -> ApiResult<DbClient> {
    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.run_migrations().await?;
    Ok(db)
}

#[tokio::test]
async fn smoke_test_full_crud_chain() -> ApiResult<()> {
    let db = test_db().await?;

    let rack = db.rack_insert(&fixtures::new_rack("smoke-rack", 42)).await?;
    assert_eq!(rack.size_u, 42);

    let mut payload = fixtures::new_device(rack.id, 10, 4);
    payload.specs.insert("cpu".to_string(), "2x Xeon".to_string());
    let server = db.device_insert(&payload).await?;
    assert_eq!(server.specs.get("cpu").map(String::as_str), Some("2x Xeon"));

    let switch = db.device_insert(&fixtures::new_device(rack.id, 42, 1)).await?;
    let connection = db
        .connection_insert(&fixtures::new_connection(server.id, switch.id))
        .await?;
    assert!(db.connection_exists(server.id, switch.id).await?);

    let in_rack = db.device_list(Some(rack.id)).await?;
    let positions: Vec<i32> = in_rack.iter().map(|d| d.position_u).collect();
    assert_eq!(positions, vec![42, 10]);

    assert!(db.connection_delete(connection.id).await?);
    assert!(db.rack_delete(rack.id).await?);
    assert!(db.device_get(server.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn smoke_test_placement_checks_against_live_rows() -> ApiResult<()> {
    let db = test_db().await?;
    let rack = db.rack_insert(&fixtures::new_rack("smoke-placement", 42)).await?;
    let device = db.device_insert(&fixtures::new_device(rack.id, 10, 4)).await?;

    let overlap = validate_placement(&db, rack.id, 12, 3, None).await;
    assert!(matches!(overlap, Err(PlacementError::PlacementConflict { .. })));

    let own_span = validate_placement(&db, rack.id, 9, 4, Some(device.id)).await;
    assert!(own_span.is_ok());

    db.rack_delete(rack.id).await?;
    Ok(())
}

#[tokio::test]
async fn smoke_test_exclusion_constraint_rejects_overlap() -> ApiResult<()> {
    let db = test_db().await?;
    let rack = db.rack_insert(&fixtures::new_rack("smoke-exclusion", 42)).await?;
    db.device_insert(&fixtures::new_device(rack.id, 10, 4)).await?;

    // Bypasses the validator; only the database guards the span.
    let err = db
        .device_insert(&fixtures::new_device(rack.id, 8, 2))
        .await
        .expect_err("overlapping insert must fail");
    assert!(matches!(
        err,
        StorageError::Conflict {
            entity_type: EntityType::Device,
            ..
        }
    ));
    assert_eq!(ApiError::from(err).code, rackview_api::ErrorCode::PlacementConflict);

    db.rack_delete(rack.id).await?;
    Ok(())
}
