//! Enum types for RackView entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY DISCRIMINATOR
// ============================================================================

/// Entity type discriminator used in storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Rack,
    Device,
    DeviceSpec,
    Connection,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EntityType::Rack => "Rack",
            EntityType::Device => "Device",
            EntityType::DeviceSpec => "DeviceSpec",
            EntityType::Connection => "Connection",
        };
        write!(f, "{}", value)
    }
}

// ============================================================================
// DEVICE ENUMS
// ============================================================================

/// Kind of hardware mounted in a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Server,
    Network,
    Storage,
}

impl DeviceType {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DeviceType::Server => "server",
            DeviceType::Network => "network",
            DeviceType::Storage => "storage",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ParseEnumError> {
        match s.to_lowercase().as_str() {
            "server" => Ok(DeviceType::Server),
            "network" => Ok(DeviceType::Network),
            "storage" => Ok(DeviceType::Storage),
            _ => Err(ParseEnumError::new("device type", s)),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for DeviceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Operational status of a device, as last set by an operator or a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Online,
    Offline,
    Warning,
    Unknown,
}

impl DeviceStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Warning => "warning",
            DeviceStatus::Unknown => "unknown",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ParseEnumError> {
        match s.to_lowercase().as_str() {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            "warning" => Ok(DeviceStatus::Warning),
            "unknown" => Ok(DeviceStatus::Unknown),
            _ => Err(ParseEnumError::new("device status", s)),
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an enum from its database string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_db_roundtrip() {
        for ty in [DeviceType::Server, DeviceType::Network, DeviceType::Storage] {
            assert_eq!(DeviceType::from_db_str(ty.as_db_str()), Ok(ty));
        }
        assert_eq!("NETWORK".parse::<DeviceType>(), Ok(DeviceType::Network));
    }

    #[test]
    fn test_device_status_rejects_unknown_value() {
        let err = "rebooting".parse::<DeviceStatus>().unwrap_err();
        assert_eq!(err.kind, "device status");
        assert!(err.to_string().contains("rebooting"));
    }

    #[test]
    fn test_device_status_defaults_to_online() {
        assert_eq!(DeviceStatus::default(), DeviceStatus::Online);
    }

    #[test]
    fn test_enums_serialize_lowercase() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&DeviceType::Storage)?, "\"storage\"");
        assert_eq!(serde_json::to_string(&DeviceStatus::Warning)?, "\"warning\"");
        Ok(())
    }
}
