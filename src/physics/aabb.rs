//! Data-Oriented Axis-Aligned Bounding Box System
//!
//! Pure functions for overlap and segment tests - no methods, just data transformations.

use glam::{DVec3, IVec3};

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: DVec3,
    pub max: DVec3,
}

/// Create new AABB from min/max points
pub fn create_aabb(min: DVec3, max: DVec3) -> AABB {
    AABB { min, max }
}

/// Create AABB from center point and half extents
pub fn aabb_from_center_half_extents(center: DVec3, half_extents: DVec3) -> AABB {
    AABB {
        min: center - half_extents,
        max: center + half_extents,
    }
}

/// The unit cube occupied by the voxel cell with the given minimum corner
pub fn aabb_for_cell(cell: IVec3) -> AABB {
    let min = cell.as_dvec3();
    AABB {
        min,
        max: min + DVec3::ONE,
    }
}

/// Get center point of AABB
pub fn aabb_center(aabb: &AABB) -> DVec3 {
    (aabb.min + aabb.max) * 0.5
}

/// Test if two AABBs intersect
///
/// Touching faces count as intersecting, so an entity resting on a cell
/// boundary is reported for both neighbouring cells.
pub fn aabb_intersects(aabb1: &AABB, aabb2: &AABB) -> bool {
    aabb1.min.x <= aabb2.max.x && aabb1.max.x >= aabb2.min.x &&
    aabb1.min.y <= aabb2.max.y && aabb1.max.y >= aabb2.min.y &&
    aabb1.min.z <= aabb2.max.z && aabb1.max.z >= aabb2.min.z
}

/// Test if AABB contains a point
pub fn aabb_contains_point(aabb: &AABB, point: DVec3) -> bool {
    point.x >= aabb.min.x && point.x <= aabb.max.x &&
    point.y >= aabb.min.y && point.y <= aabb.max.y &&
    point.z >= aabb.min.z && point.z <= aabb.max.z
}

/// Create translated copy of AABB
pub fn aabb_translated(aabb: &AABB, offset: DVec3) -> AABB {
    AABB {
        min: aabb.min + offset,
        max: aabb.max + offset,
    }
}

/// Clip the segment `start..=end` against the box
///
/// Returns the first point of the segment that lies inside the box. A segment
/// that starts inside the box reports `start`.
pub fn aabb_clip_segment(aabb: &AABB, start: DVec3, end: DVec3) -> Option<DVec3> {
    let delta = end - start;

    let mut t_min: f64 = 0.0;
    let mut t_max: f64 = 1.0;

    for axis in 0..3 {
        let origin = start[axis];
        let dir = delta[axis];
        let box_min = aabb.min[axis];
        let box_max = aabb.max[axis];

        if dir.abs() < 1e-12 {
            // Segment is parallel to this slab
            if origin < box_min || origin > box_max {
                return None;
            }
        } else {
            let t1 = (box_min - origin) / dir;
            let t2 = (box_max - origin) / dir;

            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));

            if t_min > t_max {
                return None;
            }
        }
    }

    Some(start + delta * t_min)
}
