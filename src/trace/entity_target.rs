use super::result::RayTraceHit;
use super::stepper_data::TraversalSegment;
use super::target::{Predicate, TargetStrategy};
use crate::world::{TraceEntity, WorldView};
use glam::DVec3;

/// Seeks the nearest selected entity along the ray
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTarget;

impl<E: TraceEntity> TargetStrategy<E> for EntityTarget {
    type Target = E;

    const REQUIRES_ENTITY_TRACKING: bool = true;
    const REQUIRES_FAILURE_CHECKING: bool = true;

    fn default_select() -> Predicate<E> {
        Box::new(|_: &E| true)
    }

    /// Nearest selected entity overlapping the cell that the segment passes
    /// through, regardless of the order the world lists them in.
    fn test_select<W>(
        _world: &W,
        segment: &TraversalSegment,
        entities: &[E],
        select: &dyn Fn(&E) -> bool,
    ) -> Option<RayTraceHit<E>>
    where
        W: WorldView<Entity = E>,
    {
        let mut nearest: Option<(f64, &E, DVec3)> = None;

        for entity in entities {
            if !select(entity) {
                continue;
            }
            let Some(hit_position) = entity.clip(segment.start, segment.end) else {
                continue;
            };

            let distance_sq = hit_position.distance_squared(segment.start);
            if nearest.map_or(true, |(best, _, _)| distance_sq < best) {
                nearest = Some((distance_sq, entity, hit_position));
            }
        }

        nearest.map(|(_, entity, hit_position)| RayTraceHit::new(entity.clone(), hit_position))
    }
}
