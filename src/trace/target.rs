//! Target strategies
//!
//! The traversal driver is shared; what counts as a hit in a cell, and whether
//! a hit ends the trace on the spot, is decided by the strategy.

use super::result::RayTraceHit;
use super::stepper_data::TraversalSegment;
use crate::world::{TraceEntity, WorldView};

/// Boxed predicate over a trace candidate
pub type Predicate<T> = Box<dyn Fn(&T) -> bool>;

pub trait TargetStrategy<E: TraceEntity> {
    type Target: Clone + 'static;

    /// Whether entities failing `continue_while_entity` are checked for
    /// occlusion in each cell
    const REQUIRES_ENTITY_TRACKING: bool;

    /// Whether a candidate must survive the continuation checks before it is
    /// returned. When false the first selected candidate wins outright.
    const REQUIRES_FAILURE_CHECKING: bool;

    /// Selection installed at construction and on reset
    fn default_select() -> Predicate<Self::Target>;

    /// Best selected candidate within one cell's segment
    ///
    /// `entities` are the entities overlapping the segment's cell. It is only
    /// populated when `REQUIRES_ENTITY_TRACKING` is set.
    fn test_select<W>(
        world: &W,
        segment: &TraversalSegment,
        entities: &[E],
        select: &dyn Fn(&Self::Target) -> bool,
    ) -> Option<RayTraceHit<Self::Target>>
    where
        W: WorldView<Entity = E>;
}
