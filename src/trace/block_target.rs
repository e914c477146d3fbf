use super::factory::not_passable;
use super::result::RayTraceHit;
use super::stepper_data::TraversalSegment;
use super::target::{Predicate, TargetStrategy};
use crate::world::{located_block_at, LocatedBlock, TraceEntity, VoxelPos, WorldView};

/// Seeks the first selected block along the ray
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockTarget;

impl<E: TraceEntity> TargetStrategy<E> for BlockTarget {
    type Target = LocatedBlock;

    const REQUIRES_ENTITY_TRACKING: bool = false;
    const REQUIRES_FAILURE_CHECKING: bool = false;

    fn default_select() -> Predicate<LocatedBlock> {
        Box::new(not_passable())
    }

    /// The block is hit where the ray enters its cell.
    fn test_select<W>(
        world: &W,
        segment: &TraversalSegment,
        _entities: &[E],
        select: &dyn Fn(&LocatedBlock) -> bool,
    ) -> Option<RayTraceHit<LocatedBlock>>
    where
        W: WorldView<Entity = E>,
    {
        let located = located_block_at(world, VoxelPos::from(segment.cell));
        if select(&located) {
            Some(RayTraceHit::new(located, segment.start))
        } else {
            None
        }
    }
}
