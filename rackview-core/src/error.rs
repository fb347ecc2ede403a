//! Error types for RackView operations

use thiserror::Error;

use crate::{BoundViolation, EntityType, RackId};

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: EntityType, id: i32 },

    /// A uniqueness or exclusion constraint rejected the write.
    #[error("Conflict on {entity_type}: {reason}")]
    Conflict { entity_type: EntityType, reason: String },

    /// A referenced row (rack, device) no longer exists.
    #[error("Missing reference from {entity_type}: {reason}")]
    MissingReference { entity_type: EntityType, reason: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Request validation errors raised before anything touches storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: &str) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Outcome of validating a device placement.
///
/// Storage failures are kept apart from the three validation outcomes so a
/// broken database never reads as a bad placement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("rack {rack_id} not found")]
    RackNotFound { rack_id: RackId },

    #[error("{0}")]
    PlacementInvalid(#[from] BoundViolation),

    #[error("device overlaps with existing device in rack {rack_id}")]
    PlacementConflict { rack_id: RackId },

    #[error("placement lookup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for placement validation.
pub type PlacementResult<T> = Result<T, PlacementError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityIdType;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            entity_type: EntityType::Device,
            id: 17,
        };
        let msg = err.to_string();
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Device"));
        assert!(msg.contains("17"));
    }

    #[test]
    fn test_placement_error_from_variants() {
        let invalid = PlacementError::from(BoundViolation::InvalidHeight { height: 0 });
        assert!(matches!(invalid, PlacementError::PlacementInvalid(_)));

        let storage = PlacementError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, PlacementError::Storage(_)));
    }

    #[test]
    fn test_placement_invalid_displays_bound_message() {
        let err = PlacementError::PlacementInvalid(BoundViolation::AboveHighestSlot {
            top: 43,
            rack_size_u: 42,
        });
        assert!(err.to_string().contains("exceeds rack size 42"));

        let conflict = PlacementError::PlacementConflict {
            rack_id: RackId::new(5),
        };
        assert!(conflict.to_string().contains("overlaps"));
    }

    #[test]
    fn test_validation_error_constructors() {
        assert_eq!(
            ValidationError::missing("name").to_string(),
            "Required field missing: name"
        );
        let err = ValidationError::invalid("size_u", "must be at least 1");
        assert!(err.to_string().contains("size_u"));
    }
}
