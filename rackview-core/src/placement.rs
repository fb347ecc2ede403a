//! Rack-unit placement geometry.
//!
//! A device occupies a contiguous run of rack units. Its recorded position is
//! the *top* unit and it extends downward by its height, so a device at
//! `top = 10` with `height = 4` occupies units 7 through 10. Units are
//! numbered from 1 at the bottom of the rack to `size_u` at the top.
//!
//! Everything here is a pure function of its inputs. Fetching the sibling
//! devices of a rack is the storage layer's job; see
//! `rackview_storage::placement` for the composite check used by the
//! device service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DeviceId, MountedDevice};

// ============================================================================
// SPAN
// ============================================================================

/// Closed interval `[bottom, top]` of rack units occupied by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RackUnitSpan {
    bottom: i32,
    top: i32,
}

impl RackUnitSpan {
    /// Build the span covered by a device recorded at `top` with `height` units.
    ///
    /// No bounds are checked; use [`validate_bounds`] for candidate placements.
    pub fn from_top_and_height(top: i32, height: i32) -> Self {
        Self {
            bottom: bottom_unit(top, height),
            top,
        }
    }

    /// Lowest occupied unit.
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Highest occupied unit (the recorded position).
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Number of units covered.
    pub fn height(&self) -> i32 {
        self.top - self.bottom + 1
    }

    /// Whether `unit` falls inside this span.
    pub fn contains_unit(&self, unit: i32) -> bool {
        self.bottom <= unit && unit <= self.top
    }

    /// Whether the two spans share at least one rack unit.
    pub fn overlaps(&self, other: &RackUnitSpan) -> bool {
        spans_overlap(self, other)
    }
}

fn bottom_unit(top: i32, height: i32) -> i32 {
    top.saturating_sub(height).saturating_add(1)
}

// ============================================================================
// BOUNDS
// ============================================================================

/// Reason a candidate placement does not fit inside its rack.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "bound", rename_all = "snake_case")]
pub enum BoundViolation {
    #[error("device height must be at least 1 (got {height})")]
    InvalidHeight { height: i32 },

    #[error(
        "device does not fit in rack (position {top} - size {height} + 1 = {bottom} is below U1)"
    )]
    BelowLowestSlot { top: i32, height: i32, bottom: i32 },

    #[error("device does not fit in rack (position {top} exceeds rack size {rack_size_u})")]
    AboveHighestSlot { top: i32, rack_size_u: i32 },
}

impl BoundViolation {
    /// Short machine-readable name of the violated bound.
    pub fn bound(&self) -> &'static str {
        match self {
            BoundViolation::InvalidHeight { .. } => "invalid_height",
            BoundViolation::BelowLowestSlot { .. } => "below_lowest_slot",
            BoundViolation::AboveHighestSlot { .. } => "above_highest_slot",
        }
    }
}

/// Check that a device of `height` units recorded at `top` fits in a rack of
/// `rack_size_u` units, returning the normalized span.
pub fn validate_bounds(
    rack_size_u: i32,
    top: i32,
    height: i32,
) -> Result<RackUnitSpan, BoundViolation> {
    if height < 1 {
        return Err(BoundViolation::InvalidHeight { height });
    }

    let span = RackUnitSpan::from_top_and_height(top, height);
    if span.bottom < 1 {
        return Err(BoundViolation::BelowLowestSlot {
            top,
            height,
            bottom: span.bottom,
        });
    }
    if top > rack_size_u {
        return Err(BoundViolation::AboveHighestSlot { top, rack_size_u });
    }

    Ok(span)
}

// ============================================================================
// OVERLAP
// ============================================================================

/// Closed-interval intersection test.
///
/// Covers every arrangement at once: either endpoint of one span inside the
/// other, or one span containing the other.
pub fn spans_overlap(a: &RackUnitSpan, b: &RackUnitSpan) -> bool {
    a.top >= b.bottom && a.bottom <= b.top
}

/// Whether `candidate` collides with any of `existing`, ignoring the device
/// whose id equals `exclude` (the device being moved during an update).
pub fn overlaps_any<'a, I>(candidate: &RackUnitSpan, existing: I, exclude: Option<DeviceId>) -> bool
where
    I: IntoIterator<Item = &'a MountedDevice>,
{
    existing
        .into_iter()
        .filter(|device| Some(device.id) != exclude)
        .any(|device| spans_overlap(candidate, &device.span()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityIdType;

    fn mounted(id: i32, top: i32, height: i32) -> MountedDevice {
        MountedDevice {
            id: DeviceId::new(id),
            top,
            height,
        }
    }

    #[test]
    fn test_span_from_top_extends_downward() {
        let span = RackUnitSpan::from_top_and_height(10, 4);
        assert_eq!(span.bottom(), 7);
        assert_eq!(span.top(), 10);
        assert_eq!(span.height(), 4);
        assert!(span.contains_unit(7));
        assert!(!span.contains_unit(6));
    }

    #[test]
    fn test_full_height_device_fits_at_top() {
        let span = validate_bounds(42, 42, 2).unwrap();
        assert_eq!((span.bottom(), span.top()), (41, 42));
    }

    #[test]
    fn test_device_below_first_unit_is_rejected() {
        let err = validate_bounds(42, 1, 2).unwrap_err();
        assert_eq!(
            err,
            BoundViolation::BelowLowestSlot {
                top: 1,
                height: 2,
                bottom: 0
            }
        );
        assert_eq!(err.bound(), "below_lowest_slot");
        assert!(err.to_string().contains("below U1"));
    }

    #[test]
    fn test_device_above_rack_is_rejected() {
        let err = validate_bounds(10, 11, 1).unwrap_err();
        assert_eq!(
            err,
            BoundViolation::AboveHighestSlot {
                top: 11,
                rack_size_u: 10
            }
        );
        assert!(err.to_string().contains("exceeds rack size 10"));
    }

    #[test]
    fn test_non_positive_height_is_rejected() {
        assert_eq!(
            validate_bounds(10, 5, 0),
            Err(BoundViolation::InvalidHeight { height: 0 })
        );
        assert_eq!(validate_bounds(10, 5, -3).unwrap_err().bound(), "invalid_height");
    }

    #[test]
    fn test_contained_span_overlaps() {
        let existing = RackUnitSpan::from_top_and_height(8, 4);
        let inner = RackUnitSpan::from_top_and_height(7, 2);
        assert!(spans_overlap(&existing, &inner));
        assert!(spans_overlap(&inner, &existing));
    }

    #[test]
    fn test_adjacent_spans_do_not_overlap() {
        let existing = RackUnitSpan::from_top_and_height(8, 4);
        let above = RackUnitSpan::from_top_and_height(9, 1);
        let below = RackUnitSpan::from_top_and_height(4, 4);
        assert!(!spans_overlap(&existing, &above));
        assert!(!spans_overlap(&existing, &below));
    }

    #[test]
    fn test_partial_overlap_either_end() {
        let existing = RackUnitSpan::from_top_and_height(10, 4);
        assert!(existing.overlaps(&RackUnitSpan::from_top_and_height(8, 2)));
        assert!(existing.overlaps(&RackUnitSpan::from_top_and_height(12, 3)));
        assert!(existing.overlaps(&RackUnitSpan::from_top_and_height(7, 1)));
    }

    #[test]
    fn test_overlaps_any_honours_exclusion() {
        let devices = vec![mounted(1, 10, 4), mounted(2, 3, 3)];
        let candidate = RackUnitSpan::from_top_and_height(10, 4);

        assert!(overlaps_any(&candidate, &devices, None));
        assert!(!overlaps_any(&candidate, &devices, Some(DeviceId::new(1))));
        assert!(overlaps_any(&candidate, &devices, Some(DeviceId::new(2))));
    }

    #[test]
    fn test_overlaps_any_empty_rack() {
        let candidate = RackUnitSpan::from_top_and_height(42, 42);
        let empty: Vec<MountedDevice> = Vec::new();
        assert!(!overlaps_any(&candidate, &empty, None));
    }
}
