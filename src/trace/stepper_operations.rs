//! Grid stepper operations - Pure DOP functions
//!
//! Exact cell traversal after Amanatides & Woo, extended so that a ray whose
//! start or end lies on a grid plane is attributed to the cells it actually
//! passes through.

use super::stepper_data::{GridStepper, TraversalSegment, TraversalState};
use glam::{DVec3, IVec3};

/// Slack, relative to the ray length, when deciding whether a segment reaches
/// the end point. Boundary distances clamped to the end point can fall an ulp
/// short of the length, and long rays accumulate error in `total_t`.
pub const END_TOLERANCE: f64 = 1e-12;

/// Smallest and largest floored coordinate a ray may start or end at. One
/// cell of headroom on each side keeps neighbour arithmetic inside `i32`.
pub const MIN_CELL_COORD: f64 = (i32::MIN + 1) as f64;
pub const MAX_CELL_COORD: f64 = (i32::MAX - 1) as f64;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Create a stepper for the segment `start..=end`
///
/// Returns `None` for a degenerate ray (zero or non-finite length) and for a
/// ray whose start or end cell is not addressable.
pub fn create_grid_stepper(start: DVec3, end: DVec3) -> Option<GridStepper> {
    let delta = end - start;
    let length = delta.length();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    if !is_addressable(start) || !is_addressable(end) {
        return None;
    }

    let direction = delta / length;
    let cell = initial_cell(start, direction);

    Some(GridStepper {
        origin: start,
        end,
        direction,
        length,
        step: step_signs(direction),
        cell,
        end_cell: initial_cell(end, -direction),
        state: initial_state(start, end, direction, cell),
        total_t: 0.0,
        segment_start: start,
        finished: false,
    })
}

/// Whether every axis of `point` floors into the traversable cell range
///
/// Rejects NaN coordinates as well.
pub fn is_addressable(point: DVec3) -> bool {
    point
        .floor()
        .to_array()
        .iter()
        .all(|&c| (MIN_CELL_COORD..=MAX_CELL_COORD).contains(&c))
}

/// Cell the ray starts in
///
/// A ray leaving a grid plane in the negative direction starts in the cell
/// below that plane, not the one whose minimum corner lies on it.
pub fn initial_cell(start: DVec3, direction: DVec3) -> IVec3 {
    let axis = |s: f64, d: f64| {
        let floored = s.floor();
        if d < 0.0 && floored == s {
            floored as i32 - 1
        } else {
            floored as i32
        }
    };

    IVec3::new(
        axis(start.x, direction.x),
        axis(start.y, direction.y),
        axis(start.z, direction.z),
    )
}

/// Per-axis unit step, -1, 0 or +1
pub fn step_signs(direction: DVec3) -> IVec3 {
    let sign = |d: f64| {
        if d > 0.0 {
            1
        } else if d < 0.0 {
            -1
        } else {
            0
        }
    };

    IVec3::new(sign(direction.x), sign(direction.y), sign(direction.z))
}

/// Parametric distance from the start to the first boundary of the start cell
/// on one axis, clamped to the end point
pub fn initial_boundary_distance(start: f64, direction: f64, end: f64, cell: i32) -> f64 {
    if direction > 0.0 {
        let boundary = (cell + 1) as f64;
        (end.min(boundary) - start) / direction
    } else if direction < 0.0 {
        let boundary = cell as f64;
        (end.max(boundary) - start) / direction
    } else {
        f64::INFINITY
    }
}

/// Traversal state for the first segment
pub fn initial_state(start: DVec3, end: DVec3, direction: DVec3, cell: IVec3) -> TraversalState {
    state_from_distances(
        initial_boundary_distance(start.x, direction.x, end.x, cell.x),
        initial_boundary_distance(start.y, direction.y, end.y, cell.y),
        initial_boundary_distance(start.z, direction.z, end.z, cell.z),
    )
}

// ============================================================================
// STEPPING
// ============================================================================

/// Build a state from per-axis boundary distances
pub fn state_from_distances(t_to_x: f64, t_to_y: f64, t_to_z: f64) -> TraversalState {
    let next_step = t_to_x.min(t_to_y).min(t_to_z);

    TraversalState {
        t_to_x,
        t_to_y,
        t_to_z,
        next_step,
        advance_x: t_to_x <= next_step,
        advance_y: t_to_y <= next_step,
        advance_z: t_to_z <= next_step,
    }
}

/// State after crossing the boundaries flagged in `state`
///
/// Crossed axes restart a full cell away; the others keep counting down.
pub fn next_state(state: &TraversalState, direction: DVec3, step: IVec3) -> TraversalState {
    let axis = |advance: bool, t: f64, s: i32, d: f64| {
        if advance {
            s as f64 / d
        } else {
            t - state.next_step
        }
    };

    state_from_distances(
        axis(state.advance_x, state.t_to_x, step.x, direction.x),
        axis(state.advance_y, state.t_to_y, step.y, direction.y),
        axis(state.advance_z, state.t_to_z, step.z, direction.z),
    )
}

/// Cell entered after crossing the flagged boundaries
pub fn next_cell(cell: IVec3, state: &TraversalState, step: IVec3) -> IVec3 {
    cell + IVec3::new(
        if state.advance_x { step.x } else { 0 },
        if state.advance_y { step.y } else { 0 },
        if state.advance_z { step.z } else { 0 },
    )
}

impl Iterator for GridStepper {
    type Item = TraversalSegment;

    fn next(&mut self) -> Option<TraversalSegment> {
        if self.finished {
            return None;
        }

        let reach = self.total_t + self.state.next_step;
        let is_final =
            self.cell == self.end_cell || reach >= self.length * (1.0 - END_TOLERANCE);
        let segment_end = if is_final {
            self.end
        } else {
            self.origin + self.direction * reach
        };

        let segment = TraversalSegment {
            cell: self.cell,
            start: self.segment_start,
            end: segment_end,
            is_final,
        };

        if is_final {
            self.finished = true;
        } else {
            self.cell = next_cell(self.cell, &self.state, self.step);
            self.state = next_state(&self.state, self.direction, self.step);
            self.total_t = reach;
            self.segment_start = segment_end;
        }

        Some(segment)
    }
}
