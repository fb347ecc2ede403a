//! Identity types for RackView entities

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Common behaviour for the integer id newtypes.
///
/// Ids are `SERIAL` columns in PostgreSQL, so the raw value is an `i32`.
pub trait EntityIdType:
    Copy + Eq + std::hash::Hash + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    /// Human readable entity name used in error messages.
    const ENTITY_NAME: &'static str;

    /// Wrap a raw database id.
    fn new(raw: i32) -> Self;

    /// Unwrap to the raw database id.
    fn as_i32(&self) -> i32;
}

/// Define an `i32`-backed id newtype.
///
/// The generated type is `#[serde(transparent)]` so it travels over the wire
/// as a bare number, parses from path segments, and displays as the number.
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl EntityIdType for $name {
            const ENTITY_NAME: &'static str = $entity;

            fn new(raw: i32) -> Self {
                Self(raw)
            }

            fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a rack.
    RackId,
    "Rack"
);
define_entity_id!(
    /// Identifier of a device mounted in a rack.
    DeviceId,
    "Device"
);
define_entity_id!(
    /// Identifier of a network connection between two devices.
    ConnectionId,
    "Connection"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_bare_number() -> Result<(), serde_json::Error> {
        let id = RackId::new(42);
        assert_eq!(serde_json::to_string(&id)?, "42");

        let parsed: DeviceId = serde_json::from_str("7")?;
        assert_eq!(parsed.as_i32(), 7);
        Ok(())
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("12".parse::<ConnectionId>().ok(), Some(ConnectionId::new(12)));
        assert!("abc".parse::<RackId>().is_err());
        assert_eq!(RackId::ENTITY_NAME, "Rack");
    }
}
