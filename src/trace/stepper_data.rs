//! Grid stepper data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in stepper_operations.rs

use glam::{DVec3, IVec3};

/// Per-step parametric distances along the normalized ray direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalState {
    /// Distance to the next X boundary (infinite when the ray has no X motion)
    pub t_to_x: f64,
    pub t_to_y: f64,
    pub t_to_z: f64,

    /// Smallest of the three distances
    pub next_step: f64,

    /// Axes whose boundary is reached at `next_step`. Several may be set at
    /// once when the ray crosses an edge or corner.
    pub advance_x: bool,
    pub advance_y: bool,
    pub advance_z: bool,
}

/// The part of the ray lying inside one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalSegment {
    pub cell: IVec3,
    pub start: DVec3,
    pub end: DVec3,

    /// Set on the segment that ends at the ray's end point
    pub is_final: bool,
}

/// Walks the cells a finite ray passes through, in order
#[derive(Debug, Clone)]
pub struct GridStepper {
    pub origin: DVec3,
    pub end: DVec3,

    /// Normalized
    pub direction: DVec3,
    pub length: f64,

    /// Per-axis sign of the direction
    pub step: IVec3,

    pub cell: IVec3,
    /// Last cell before the end point, approached along `direction`
    pub end_cell: IVec3,
    pub state: TraversalState,

    /// Parametric distance already covered
    pub total_t: f64,
    pub segment_start: DVec3,
    pub finished: bool,
}
