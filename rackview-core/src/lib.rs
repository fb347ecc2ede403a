//! RackView Core - Entity Types and Placement Geometry
//!
//! Pure data structures plus the rack-unit placement rules. All other crates
//! depend on this. Nothing in here performs I/O.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod placement;

pub use entities::{
    Device, DeviceSpecs, MountedDevice, NetworkConnection, NewConnection, NewDevice, NewRack,
    Rack,
};
pub use enums::{DeviceStatus, DeviceType, EntityType, ParseEnumError};
pub use error::{PlacementError, PlacementResult, StorageError, StorageResult, ValidationError};
pub use identity::{ConnectionId, DeviceId, EntityIdType, RackId, Timestamp};
pub use placement::{overlaps_any, spans_overlap, validate_bounds, BoundViolation, RackUnitSpan};
