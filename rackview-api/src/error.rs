//! Error Types for RackView API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rackview_core::{EntityType, PlacementError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request body is not valid JSON for the endpoint
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field or path parameter format is incorrect
    InvalidFormat,

    /// Device span does not fit inside its rack
    PlacementInvalid,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested route or entity does not exist
    EntityNotFound,

    /// Requested rack does not exist
    RackNotFound,

    /// Requested device does not exist
    DeviceNotFound,

    /// Requested network connection does not exist
    ConnectionNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same identity already exists
    EntityAlreadyExists,

    /// Device span overlaps another device in the same rack
    PlacementConflict,

    /// Operation conflicts with current state
    StateConflict,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat
            | ErrorCode::PlacementInvalid => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound
            | ErrorCode::RackNotFound
            | ErrorCode::DeviceNotFound
            | ErrorCode::ConnectionNotFound => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists
            | ErrorCode::PlacementConflict
            | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError
            | ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::PlacementInvalid => "Device does not fit in rack",

            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::RackNotFound => "Rack not found",
            ErrorCode::DeviceNotFound => "Device not found",
            ErrorCode::ConnectionNotFound => "Connection not found",

            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::PlacementConflict => "Device overlaps with existing device",
            ErrorCode::StateConflict => "Operation conflicts with current state",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending field, violated bound)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    /// Generic not found error with custom message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    pub fn rack_not_found(rack_id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::RackNotFound, format!("rack {} not found", rack_id))
    }

    pub fn device_not_found(device_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::DeviceNotFound,
            format!("device {} not found", device_id),
        )
    }

    pub fn connection_not_found(connection_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConnectionNotFound,
            format!("connection {} not found", connection_id),
        )
    }

    pub fn entity_already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityAlreadyExists, message)
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_format("id", &format!("integer ({})", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity_type, id } => match entity_type {
                EntityType::Rack => ApiError::rack_not_found(id),
                EntityType::Device | EntityType::DeviceSpec => ApiError::device_not_found(id),
                EntityType::Connection => ApiError::connection_not_found(id),
            },
            // The only device-level conflict the store raises is an occupied span.
            StorageError::Conflict {
                entity_type: EntityType::Device,
                ..
            } => ApiError::from_code(ErrorCode::PlacementConflict),
            StorageError::Conflict { reason, .. } => ApiError::entity_already_exists(reason),
            StorageError::MissingReference {
                entity_type: EntityType::Device,
                reason,
            } => ApiError::new(ErrorCode::RackNotFound, reason),
            StorageError::MissingReference { reason, .. } => {
                ApiError::new(ErrorCode::DeviceNotFound, reason)
            }
            StorageError::Unavailable { reason } => {
                tracing::error!(%reason, "Storage unavailable");
                ApiError::service_unavailable("Database is unavailable")
            }
            StorageError::Backend { reason } => {
                tracing::error!(%reason, "Storage backend error");
                ApiError::database_error("Database operation failed")
            }
            StorageError::LockPoisoned => {
                tracing::error!("Storage lock poisoned");
                ApiError::internal_error("Storage lock poisoned")
            }
        }
    }
}

impl From<PlacementError> for ApiError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::RackNotFound { rack_id } => ApiError::rack_not_found(rack_id),
            PlacementError::PlacementInvalid(violation) => {
                ApiError::new(ErrorCode::PlacementInvalid, violation.to_string())
                    .with_details(serde_json::json!({ "bound": violation.bound() }))
            }
            PlacementError::PlacementConflict { rack_id } => ApiError::new(
                ErrorCode::PlacementConflict,
                format!("device overlaps with existing device in rack {}", rack_id),
            ),
            PlacementError::Storage(storage) => ApiError::from(storage),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::InvalidValue { field, reason } => {
                ApiError::validation_failed(format!("Invalid value for {}: {}", field, reason))
                    .with_details(serde_json::json!({ "field": field }))
            }
        }
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rackview_core::{BoundViolation, EntityIdType, RackId};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::PlacementInvalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::RackNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::PlacementConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::StateConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_placement_invalid_carries_bound() {
        let err = ApiError::from(PlacementError::PlacementInvalid(
            BoundViolation::BelowLowestSlot {
                top: 1,
                height: 2,
                bottom: 0,
            },
        ));
        assert_eq!(err.code, ErrorCode::PlacementInvalid);
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "bound": "below_lowest_slot" }))
        );
        assert!(err.message.contains("below U1"));
    }

    #[test]
    fn test_placement_conflict_does_not_name_colliding_device() {
        let err = ApiError::from(PlacementError::PlacementConflict {
            rack_id: RackId::new(3),
        });
        assert_eq!(err.code, ErrorCode::PlacementConflict);
        assert_eq!(err.details, None);
    }

    #[test]
    fn test_storage_failure_is_never_a_placement_verdict() {
        let err = ApiError::from(PlacementError::Storage(StorageError::Backend {
            reason: "relation \"devices\" does not exist".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("devices"));

        let err = ApiError::from(PlacementError::Storage(StorageError::Unavailable {
            reason: "pool closed".to_string(),
        }));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_exclusion_violation_maps_to_placement_conflict() {
        let err = ApiError::from(StorageError::Conflict {
            entity_type: EntityType::Device,
            reason: "devices_no_overlap".to_string(),
        });
        assert_eq!(err.code, ErrorCode::PlacementConflict);

        let err = ApiError::from(StorageError::Conflict {
            entity_type: EntityType::Connection,
            reason: "connection already exists".to_string(),
        });
        assert_eq!(err.code, ErrorCode::EntityAlreadyExists);
    }

    #[test]
    fn test_validation_error_conversion() {
        let err = ApiError::from(ValidationError::missing("name"));
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("name"));

        let err = ApiError::from(ValidationError::invalid("size_u", "must be at least 1"));
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details, Some(serde_json::json!({ "field": "size_u" })));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::rack_not_found(7);
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("RACK_NOT_FOUND"));
        assert!(json.contains("rack 7 not found"));
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
