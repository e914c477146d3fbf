//! Ray trace requests
//!
//! A request is configured with chained setters, then executed against a
//! world resolver. Execution walks the cells between the start and end point
//! and hands each cell's segment to the target strategy.

use super::result::RayTraceHit;
use super::stepper_data::TraversalSegment;
use super::stepper_operations::{create_grid_stepper, is_addressable};
use super::target::{Predicate, TargetStrategy};
use crate::error::{OptionExt, TraceError, TraceResult};
use crate::physics::aabb_for_cell;
use crate::world::{
    located_block_at, Living, LocatedBlock, TraceEntity, VoxelPos, WorldKey, WorldLocation,
    WorldResolver, WorldView,
};
use crate::TraceConfig;
use glam::DVec3;
use std::fmt;
use std::marker::PhantomData;

/// A configurable ray trace seeking targets of strategy `S`
pub struct RayTrace<S, E>
where
    S: TargetStrategy<E>,
    E: TraceEntity,
{
    start: Option<DVec3>,
    /// Normalized. Mutually exclusive with `end`.
    direction: Option<DVec3>,
    end: Option<DVec3>,
    limit: u32,
    world: Option<WorldKey>,

    continue_while_location: Option<Predicate<WorldLocation>>,
    continue_while_block: Option<Predicate<LocatedBlock>>,
    continue_while_entity: Option<Predicate<E>>,
    select: Predicate<S::Target>,
    has_custom_selection: bool,

    // Construction-time defaults, restored by reset()
    default_limit: u32,
    log_steps: bool,

    _strategy: PhantomData<fn() -> S>,
}

impl<S, E> fmt::Debug for RayTrace<S, E>
where
    S: TargetStrategy<E>,
    E: TraceEntity,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicate = |set: bool| if set { Some("<predicate>") } else { None };

        f.debug_struct("RayTrace")
            .field("start", &self.start)
            .field("direction", &self.direction)
            .field("end", &self.end)
            .field("limit", &self.limit)
            .field("world", &self.world)
            .field(
                "continue_while_location",
                &predicate(self.continue_while_location.is_some()),
            )
            .field(
                "continue_while_block",
                &predicate(self.continue_while_block.is_some()),
            )
            .field(
                "continue_while_entity",
                &predicate(self.continue_while_entity.is_some()),
            )
            .field("has_custom_selection", &self.has_custom_selection)
            .finish()
    }
}

impl<S, E> Default for RayTrace<S, E>
where
    S: TargetStrategy<E>,
    E: TraceEntity,
{
    fn default() -> Self {
        Self::with_config(&TraceConfig::default())
    }
}

impl<S, E> RayTrace<S, E>
where
    S: TargetStrategy<E>,
    E: TraceEntity,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Request whose default limit and step logging come from `config`
    pub fn with_config(config: &TraceConfig) -> Self {
        Self {
            start: None,
            direction: None,
            end: None,
            limit: config.default_limit,
            world: None,
            continue_while_location: None,
            continue_while_block: None,
            continue_while_entity: None,
            select: S::default_select(),
            has_custom_selection: false,
            default_limit: config.default_limit,
            log_steps: config.log_steps,
            _strategy: PhantomData,
        }
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    /// Trace through `world`. Only its key is kept; the world is looked up
    /// again when the trace executes.
    pub fn world<W: WorldView>(&mut self, world: &W) -> &mut Self {
        self.world = Some(world.key().clone());
        self
    }

    pub fn world_key(&mut self, key: impl Into<WorldKey>) -> &mut Self {
        self.world = Some(key.into());
        self
    }

    pub fn source_position(&mut self, position: DVec3) -> &mut Self {
        self.start = Some(position);
        self
    }

    /// Start at the eyes of `living`, in the world it stands in
    pub fn source_eye_position<L: Living>(&mut self, living: &L) -> &mut Self {
        self.start = Some(living.eye_position());
        self.world = Some(living.world_key());
        self
    }

    /// Trace `limit` blocks along `direction`. Clears any end point.
    pub fn direction(&mut self, direction: DVec3) -> &mut Self {
        self.direction = Some(direction.normalize_or_zero());
        self.end = None;
        self
    }

    /// Distance in blocks traced along the direction
    pub fn limit(&mut self, limit: u32) -> TraceResult<&mut Self> {
        if limit < 1 {
            return Err(TraceError::configuration("limit must be at least 1"));
        }
        self.limit = limit;
        Ok(self)
    }

    /// Trace up to `end`. Clears any direction.
    pub fn continue_until(&mut self, end: DVec3) -> &mut Self {
        self.end = Some(end);
        self.direction = None;
        self
    }

    /// Stop without a result at the first cell failing `predicate`.
    /// Repeated calls must all pass.
    pub fn continue_while_location(
        &mut self,
        predicate: impl Fn(&WorldLocation) -> bool + 'static,
    ) -> &mut Self {
        self.continue_while_location =
            Some(and_compose(self.continue_while_location.take(), predicate));
        self
    }

    /// Stop without a result at the first block failing `predicate`.
    /// Repeated calls must all pass.
    pub fn continue_while_block(
        &mut self,
        predicate: impl Fn(&LocatedBlock) -> bool + 'static,
    ) -> &mut Self {
        self.continue_while_block = Some(and_compose(self.continue_while_block.take(), predicate));
        self
    }

    /// Entities failing `predicate` occlude anything behind them. Only entity
    /// traces consult it. Repeated calls must all pass.
    pub fn continue_while_entity(
        &mut self,
        predicate: impl Fn(&E) -> bool + 'static,
    ) -> &mut Self {
        self.continue_while_entity =
            Some(and_compose(self.continue_while_entity.take(), predicate));
        self
    }

    /// Accept targets matching `predicate`
    ///
    /// The first call replaces the default selection; later calls widen it,
    /// accepting targets matching any of the supplied predicates.
    pub fn select(&mut self, predicate: impl Fn(&S::Target) -> bool + 'static) -> &mut Self {
        if self.has_custom_selection {
            let previous = std::mem::replace(&mut self.select, Box::new(|_: &S::Target| false));
            self.select = Box::new(move |target: &S::Target| previous(target) || predicate(target));
        } else {
            self.select = Box::new(predicate);
            self.has_custom_selection = true;
        }
        self
    }

    /// Restore the state the request was constructed with
    pub fn reset(&mut self) -> &mut Self {
        self.start = None;
        self.direction = None;
        self.end = None;
        self.limit = self.default_limit;
        self.world = None;
        self.continue_while_location = None;
        self.continue_while_block = None;
        self.continue_while_entity = None;
        self.select = S::default_select();
        self.has_custom_selection = false;
        self
    }

    // ========================================================================
    // EXECUTION
    // ========================================================================

    /// Run the trace against the worlds known to `worlds`
    ///
    /// Returns `Ok(None)` when nothing in range was selected or a
    /// continuation predicate stopped the trace.
    pub fn execute<R>(&self, worlds: &R) -> TraceResult<Option<RayTraceHit<S::Target>>>
    where
        R: WorldResolver,
        R::World: WorldView<Entity = E>,
    {
        let start = self.start.ok_or_config("source position must be set")?;
        let end = match (self.end, self.direction) {
            (Some(end), _) => end,
            (None, Some(direction)) => start + direction * f64::from(self.limit),
            (None, None) => {
                return Err(TraceError::configuration(
                    "either a direction or an end point must be set",
                ))
            }
        };
        let key = self.world.as_ref().ok_or_config("world must be set")?;

        if !is_addressable(start) || !is_addressable(end) {
            return Err(TraceError::configuration(
                "ray leaves the addressable cell range",
            ));
        }
        let stepper = create_grid_stepper(start, end)
            .ok_or_config("start and end of the ray must differ")?;

        let world = worlds.resolve(key).ok_or_else(|| {
            TraceError::configuration(format!("world '{}' is not loaded", key))
        })?;

        log::debug!(
            "[RayTrace::execute] Tracing {:?} -> {:?} in '{}' (length {:.3})",
            start,
            end,
            key,
            stepper.length
        );

        for segment in stepper {
            if self.log_steps {
                log::trace!(
                    "[RayTrace::execute] Cell {:?}: {:?} -> {:?}",
                    segment.cell,
                    segment.start,
                    segment.end
                );
            }

            let position = VoxelPos::from(segment.cell);

            if let Some(continue_while_location) = &self.continue_while_location {
                let location = WorldLocation {
                    world: key.clone(),
                    position,
                };
                if !continue_while_location(&location) {
                    log::debug!("[RayTrace::execute] Stopped by location {:?}", position);
                    return Ok(None);
                }
            }

            let entities = if S::REQUIRES_ENTITY_TRACKING {
                world.entities_in(&aabb_for_cell(segment.cell))
            } else {
                Vec::new()
            };

            let candidate = S::test_select(world, &segment, &entities, &*self.select);
            if candidate.is_some() && !S::REQUIRES_FAILURE_CHECKING {
                log::debug!("[RayTrace::execute] Hit at {:?}", position);
                return Ok(candidate);
            }

            if let Some(continue_while_block) = &self.continue_while_block {
                if !continue_while_block(&located_block_at(world, position)) {
                    log::debug!("[RayTrace::execute] Stopped by block at {:?}", position);
                    return Ok(None);
                }
            }

            if S::REQUIRES_ENTITY_TRACKING {
                if let Some(continue_while_entity) = &self.continue_while_entity {
                    if is_occluded(&entities, &segment, candidate.as_ref(), continue_while_entity)
                    {
                        log::debug!("[RayTrace::execute] Occluded by entity in {:?}", position);
                        return Ok(None);
                    }
                }
            }

            if candidate.is_some() {
                log::debug!("[RayTrace::execute] Hit at {:?}", position);
                return Ok(candidate);
            }
        }

        log::debug!("[RayTrace::execute] Nothing selected before the end of the ray");
        Ok(None)
    }
}

/// AND `next` onto an optional existing predicate
fn and_compose<T: 'static>(
    current: Option<Predicate<T>>,
    next: impl Fn(&T) -> bool + 'static,
) -> Predicate<T> {
    match current {
        Some(current) => Box::new(move |value: &T| current(value) && next(value)),
        None => Box::new(next),
    }
}

/// Whether an entity failing the continuation predicate is struck strictly
/// before the candidate within this segment
///
/// Distances are measured from the segment start. Without a candidate any
/// such entity on the segment occludes.
fn is_occluded<E: TraceEntity, T>(
    entities: &[E],
    segment: &TraversalSegment,
    candidate: Option<&RayTraceHit<T>>,
    continue_while_entity: &Predicate<E>,
) -> bool {
    let candidate_distance = candidate
        .map(|hit| hit.hit_position().distance_squared(segment.start))
        .unwrap_or(f64::INFINITY);

    entities
        .iter()
        .filter(|&entity| !continue_while_entity(entity))
        .filter_map(|entity| entity.clip(segment.start, segment.end))
        .any(|hit| hit.distance_squared(segment.start) < candidate_distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::AABB;
    use crate::trace::factory::{
        block_ray_trace, block_ray_trace_with_config, entity_ray_trace, only_passable,
    };
    use crate::trace::{BlockRayTrace, EntityRayTrace};
    use crate::world::{BlockId, BoxEntity, Observer, SparseWorld, WorldRegistry};
    use std::cell::Cell;
    use std::rc::Rc;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// A stone block at (0, 2, 0) under open air
    fn column_world() -> WorldRegistry {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(0, 2, 0), BlockId::STONE);
        let mut registry = WorldRegistry::new();
        registry.load(world);
        registry
    }

    /// Entities along +X at y = z = 0.5
    fn entity_world(entities: Vec<BoxEntity>) -> WorldRegistry {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        for entity in entities {
            world.spawn(entity);
        }
        let mut registry = WorldRegistry::new();
        registry.load(world);
        registry
    }

    fn small_box(id: u32, x: f64) -> BoxEntity {
        BoxEntity::centered(id, DVec3::new(x, 0.5, 0.5), DVec3::splat(0.2))
    }

    /// Counts the entity queries made against the wrapped world
    struct CountingWorld {
        inner: SparseWorld,
        queries: Cell<usize>,
    }

    impl WorldView for CountingWorld {
        type Entity = BoxEntity;

        fn key(&self) -> &WorldKey {
            self.inner.key()
        }

        fn block_at(&self, pos: VoxelPos) -> BlockId {
            self.inner.block_at(pos)
        }

        fn entities_in(&self, region: &AABB) -> Vec<BoxEntity> {
            self.queries.set(self.queries.get() + 1);
            self.inner.entities_in(region)
        }
    }

    impl WorldResolver for CountingWorld {
        type World = CountingWorld;

        fn resolve(&self, key: &WorldKey) -> Option<&CountingWorld> {
            (self.key() == key).then_some(self)
        }
    }

    fn east_trace() -> EntityRayTrace {
        let mut trace = entity_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X);
        trace
    }

    // ------------------------------------------------------------------------
    // Configuration failures
    // ------------------------------------------------------------------------

    #[test]
    fn test_missing_start_fails() {
        let mut trace: BlockRayTrace = block_ray_trace();
        trace.world_key("overworld").direction(DVec3::NEG_Y);
        assert!(matches!(
            trace.execute(&column_world()),
            Err(TraceError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_direction_and_end_fails() {
        let mut trace: BlockRayTrace = block_ray_trace();
        trace.world_key("overworld").source_position(DVec3::ZERO);
        assert!(trace.execute(&column_world()).is_err());
    }

    #[test]
    fn test_missing_world_fails() {
        let mut trace: BlockRayTrace = block_ray_trace();
        trace.source_position(DVec3::ZERO).direction(DVec3::X);
        assert!(trace.execute(&column_world()).is_err());
    }

    #[test]
    fn test_unloaded_world_fails() {
        let mut trace: BlockRayTrace = block_ray_trace();
        trace
            .world_key("nether")
            .source_position(DVec3::ZERO)
            .direction(DVec3::X);
        let err = trace.execute(&column_world()).expect_err("world is not loaded");
        assert_eq!(
            err,
            TraceError::configuration("world 'nether' is not loaded")
        );
    }

    #[test]
    fn test_world_is_resolved_at_execute() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(0, 2, 0), BlockId::STONE);

        let mut trace = block_ray_trace();
        trace
            .world(&world)
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y);

        let key = WorldKey::from("overworld");
        let mut registry = WorldRegistry::new();
        registry.load(world);
        let hit = trace.execute(&registry).unwrap().expect("stone below");
        assert_eq!(hit.target().position, VoxelPos::new(0, 2, 0));

        registry
            .get_mut(&key)
            .expect("world is loaded")
            .set_block(VoxelPos::new(0, 4, 0), BlockId::DIRT);
        let hit = trace.execute(&registry).unwrap().expect("dirt below");
        assert_eq!(hit.target().block, BlockId::DIRT);

        assert!(registry.unload(&key).is_some());
        assert_eq!(
            trace.execute(&registry),
            Err(TraceError::configuration("world 'overworld' is not loaded"))
        );
    }

    #[test]
    fn test_ray_outside_cell_range_fails() {
        let start = DVec3::new(2147483647.5, 0.5, 0.5);

        let mut trace: BlockRayTrace = block_ray_trace();
        trace.world_key("overworld").source_position(start).direction(DVec3::X);
        assert_eq!(
            trace.execute(&column_world()),
            Err(TraceError::configuration("ray leaves the addressable cell range"))
        );

        // In range at the start, but the limit carries it past the last cell
        trace
            .source_position(DVec3::new(2147483640.5, 0.5, 0.5))
            .limit(100)
            .unwrap();
        assert!(matches!(
            trace.execute(&column_world()),
            Err(TraceError::Configuration { .. })
        ));

        trace.limit(3).unwrap();
        assert_eq!(trace.execute(&column_world()), Ok(None));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut trace: BlockRayTrace = block_ray_trace();
        assert!(trace.limit(0).is_err());
        assert!(trace.limit(1).is_ok());
    }

    #[test]
    fn test_degenerate_ray_fails() {
        let start = DVec3::new(0.5, 5.0, 0.5);

        let mut trace: BlockRayTrace = block_ray_trace();
        trace.world_key("overworld").source_position(start).continue_until(start);
        assert!(trace.execute(&column_world()).is_err());

        let mut trace: BlockRayTrace = block_ray_trace();
        trace.world_key("overworld").source_position(start).direction(DVec3::ZERO);
        assert!(trace.execute(&column_world()).is_err());
    }

    // ------------------------------------------------------------------------
    // Block traces
    // ------------------------------------------------------------------------

    #[test]
    fn test_straight_down_hits_top_face() {
        init_logging();
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y);

        let hit = trace.execute(&registry).unwrap().expect("stone below");
        assert_eq!(hit.target().position, VoxelPos::new(0, 2, 0));
        assert_eq!(hit.target().block, BlockId::STONE);
        assert_eq!(hit.hit_position().y, 3.0);
    }

    #[test]
    fn test_limit_exhausted_before_block() {
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y)
            .limit(1)
            .unwrap();

        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_only_passable_returns_start_cell() {
        let registry = column_world();
        let start = DVec3::new(0.5, 5.5, 0.5);
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(start)
            .direction(DVec3::NEG_Y)
            .select(only_passable());

        let hit = trace.execute(&registry).unwrap().expect("open air");
        assert_eq!(hit.target().position, VoxelPos::new(0, 5, 0));
        assert_eq!(hit.hit_position(), start);
    }

    #[test]
    fn test_only_passable_from_inside_solid_column() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        for y in 0..10 {
            world.set_block(VoxelPos::new(0, y, 0), BlockId::STONE);
        }
        world.set_block(VoxelPos::new(0, 6, 0), BlockId::AIR);
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 9.5, 0.5))
            .direction(DVec3::NEG_Y)
            .select(only_passable());
        let hit = trace.execute(&registry).unwrap().expect("air pocket");
        assert_eq!(hit.target().position, VoxelPos::new(0, 6, 0));
        assert_eq!(hit.hit_position().y, 7.0);

        trace.limit(2).unwrap();
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_continue_until_end_point() {
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .continue_until(DVec3::new(0.5, 3.5, 0.5));
        assert_eq!(trace.execute(&registry).unwrap(), None);

        trace.continue_until(DVec3::new(0.5, 2.5, 0.5));
        assert!(trace.execute(&registry).unwrap().is_some());
    }

    #[test]
    fn test_end_on_boundary_does_not_reach_next_cell() {
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .continue_until(DVec3::new(0.5, 3.0, 0.5));
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_direction_clears_end_point() {
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .continue_until(DVec3::new(0.5, 4.5, 0.5))
            .direction(DVec3::new(0.0, -3.0, 0.0));
        assert!(trace.execute(&registry).unwrap().is_some());
    }

    #[test]
    fn test_select_or_composes_after_first_call() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(2, 0, 0), BlockId::STONE);
        world.set_block(VoxelPos::new(4, 0, 0), BlockId::GLASS);
        world.set_block(VoxelPos::new(6, 0, 0), BlockId::WOOD);
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .select(|located| located.block == BlockId::WOOD);
        let hit = trace.execute(&registry).unwrap().expect("wood");
        assert_eq!(hit.target().position, VoxelPos::new(6, 0, 0));

        trace.select(|located| located.block == BlockId::GLASS);
        let hit = trace.execute(&registry).unwrap().expect("glass");
        assert_eq!(hit.target().position, VoxelPos::new(4, 0, 0));
    }

    #[test]
    fn test_continue_while_block_and_composes() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(2, 0, 0), BlockId::WATER);
        world.set_block(VoxelPos::new(4, 0, 0), BlockId::STONE);
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .select(|located| located.block == BlockId::STONE)
            .continue_while_block(|_| true);
        assert!(trace.execute(&registry).unwrap().is_some());

        trace.continue_while_block(|located| located.block != BlockId::WATER);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_location_failure_is_fail_fast() {
        let registry = column_world();
        let selected = Rc::new(Cell::new(0));
        let counter = Rc::clone(&selected);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y)
            .continue_while_location(|_| false)
            .select(move |_| {
                counter.set(counter.get() + 1);
                true
            });

        assert_eq!(trace.execute(&registry).unwrap(), None);
        assert_eq!(selected.get(), 0);
    }

    #[test]
    fn test_continue_while_location_and_composes() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(5, 0, 0), BlockId::STONE);
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .continue_while_location(|location| location.position.x != 7);
        assert!(trace.execute(&registry).unwrap().is_some());

        trace.continue_while_location(|location| location.position.x != 3);
        assert_eq!(trace.execute(&registry).unwrap(), None);

        // Either predicate alone failing is enough
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .continue_while_location(|location| location.position.x != 3)
            .continue_while_location(|location| location.position.x != 7);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_location_predicate_sees_each_cell() {
        let registry = column_world();
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y)
            .continue_while_location(|location| location.position.y > 3);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_eye_position_sets_start_and_world() {
        let registry = column_world();
        let observer = Observer {
            world: WorldKey::from("overworld"),
            feet: DVec3::new(0.5, 3.0, 0.5),
            eye_height: 1.5,
        };

        let mut trace = block_ray_trace();
        trace.source_eye_position(&observer).direction(DVec3::NEG_Y);
        let hit = trace.execute(&registry).unwrap().expect("stone below");
        assert_eq!(hit.target().world, WorldKey::from("overworld"));
        assert_eq!(hit.hit_position(), DVec3::new(0.5, 3.0, 0.5));
        assert_eq!(hit.distance_from(observer.eye_position()), 1.5);
    }

    #[test]
    fn test_block_trace_ignores_entity_continuation() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(3, 0, 0), BlockId::STONE);
        world.spawn(small_box(1, 1.5));
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .continue_while_entity(|_| false);
        assert!(trace.execute(&registry).unwrap().is_some());
    }

    #[test]
    fn test_reset_matches_fresh_request() {
        let registry = column_world();
        let configure = |trace: &mut BlockRayTrace| {
            trace
                .world_key("overworld")
                .source_position(DVec3::new(0.5, 5.0, 0.5))
                .direction(DVec3::NEG_Y);
        };

        let mut fresh = block_ray_trace();
        configure(&mut fresh);
        let expected = fresh.execute(&registry).unwrap();

        let mut reused = block_ray_trace();
        reused
            .world_key("nether")
            .limit(1)
            .unwrap()
            .select(only_passable())
            .continue_while_block(|_| false)
            .continue_while_location(|_| false);
        reused.reset();
        assert!(reused.execute(&registry).is_err());

        configure(&mut reused);
        assert_eq!(reused.execute(&registry).unwrap(), expected);

        // reset twice is the same as once
        reused.reset().reset();
        configure(&mut reused);
        assert_eq!(reused.execute(&registry).unwrap(), expected);
    }

    #[test]
    fn test_reset_restores_configured_limit() {
        let registry = column_world();
        let config = TraceConfig {
            default_limit: 2,
            log_steps: true,
        };

        let mut trace: BlockRayTrace = block_ray_trace_with_config(&config);
        trace.limit(10).unwrap();
        trace.reset();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 5.0, 0.5))
            .direction(DVec3::NEG_Y);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    // ------------------------------------------------------------------------
    // Entity traces
    // ------------------------------------------------------------------------

    #[test]
    fn test_entity_nearer_wins_regardless_of_order() {
        for entities in [
            vec![small_box(1, 3.5), small_box(2, 6.5)],
            vec![small_box(2, 6.5), small_box(1, 3.5)],
        ] {
            let registry = entity_world(entities);
            let hit = east_trace().execute(&registry).unwrap().expect("entity");
            assert_eq!(hit.target().id, 1);
            assert!((hit.hit_position().x - 3.3).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nearer_within_one_cell_wins() {
        let near = BoxEntity::centered(1, DVec3::new(3.3, 0.5, 0.5), DVec3::splat(0.1));
        let far = BoxEntity::centered(2, DVec3::new(3.7, 0.5, 0.5), DVec3::splat(0.1));
        for entities in [vec![near.clone(), far.clone()], vec![far, near]] {
            let registry = entity_world(entities);
            let hit = east_trace().execute(&registry).unwrap().expect("entity");
            assert_eq!(hit.target().id, 1);
        }
    }

    #[test]
    fn test_entity_select_narrows_candidates() {
        let registry = entity_world(vec![small_box(1, 3.5), small_box(2, 6.5)]);
        let mut trace = east_trace();
        trace.select(|entity| entity.id == 2);
        let hit = trace.execute(&registry).unwrap().expect("entity 2");
        assert_eq!(hit.into_target().id, 2);
    }

    #[test]
    fn test_rejected_entity_occludes_farther_candidate() {
        init_logging();
        let registry = entity_world(vec![small_box(1, 3.5), small_box(2, 6.5)]);

        let mut trace = east_trace();
        trace.select(|entity| entity.id == 2);
        trace.continue_while_entity(|entity| entity.id != 1);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_continue_while_entity_and_composes() {
        let mut trace = east_trace();
        trace
            .select(|entity| entity.id == 2)
            .continue_while_entity(|entity| entity.id != 1)
            .continue_while_entity(|entity| entity.id != 3);

        let registry = entity_world(vec![small_box(1, 3.5), small_box(2, 6.5)]);
        assert_eq!(trace.execute(&registry).unwrap(), None);

        let registry = entity_world(vec![small_box(3, 3.5), small_box(2, 6.5)]);
        assert_eq!(trace.execute(&registry).unwrap(), None);

        let registry = entity_world(vec![small_box(4, 3.5), small_box(2, 6.5)]);
        let hit = trace.execute(&registry).unwrap().expect("entity 2");
        assert_eq!(hit.target().id, 2);
    }

    #[test]
    fn test_entities_queried_once_per_cell() {
        let mut inner: SparseWorld = SparseWorld::new("overworld");
        inner.spawn(small_box(1, 3.5));
        let world = CountingWorld {
            inner,
            queries: Cell::new(0),
        };

        // Cells 0 through 5, with selection and occlusion both active
        let mut trace = east_trace();
        trace
            .limit(5)
            .unwrap()
            .select(|entity| entity.id == 2)
            .continue_while_entity(|_| true);
        assert_eq!(trace.execute(&world).unwrap(), None);
        assert_eq!(world.queries.get(), 6);

        world.queries.set(0);
        let mut trace = block_ray_trace();
        trace
            .world_key("overworld")
            .source_position(DVec3::new(0.5, 0.5, 0.5))
            .direction(DVec3::X)
            .limit(5)
            .unwrap()
            .continue_while_entity(|_| true);
        assert_eq!(trace.execute(&world).unwrap(), None);
        assert_eq!(world.queries.get(), 0);
    }

    #[test]
    fn test_rejected_entity_in_same_cell_occludes() {
        let blocker = BoxEntity::centered(1, DVec3::new(3.3, 0.5, 0.5), DVec3::splat(0.1));
        let target = BoxEntity::centered(2, DVec3::new(3.7, 0.5, 0.5), DVec3::splat(0.1));
        let registry = entity_world(vec![target, blocker]);

        let mut trace = east_trace();
        trace
            .select(|entity| entity.id == 2)
            .continue_while_entity(|entity| entity.id != 1);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_rejected_entity_behind_candidate_does_not_occlude() {
        let registry = entity_world(vec![small_box(1, 6.5), small_box(2, 3.5)]);

        let mut trace = east_trace();
        trace.continue_while_entity(|entity| entity.id != 1);
        let hit = trace.execute(&registry).unwrap().expect("entity 2");
        assert_eq!(hit.target().id, 2);
    }

    #[test]
    fn test_selected_entity_failing_continuation_is_still_hit() {
        let registry = entity_world(vec![small_box(1, 3.5)]);

        let mut trace = east_trace();
        trace.continue_while_entity(|entity| entity.id != 1);
        let hit = trace.execute(&registry).unwrap().expect("entity 1");
        assert_eq!(hit.target().id, 1);
    }

    #[test]
    fn test_entity_beyond_limit_is_missed() {
        let registry = entity_world(vec![small_box(1, 12.5)]);
        let mut trace = east_trace();
        trace.limit(10).unwrap();
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }

    #[test]
    fn test_block_continuation_walls_off_entities() {
        let mut world: SparseWorld = SparseWorld::new("overworld");
        world.set_block(VoxelPos::new(2, 0, 0), BlockId::STONE);
        world.spawn(small_box(1, 4.5));
        let mut registry = WorldRegistry::new();
        registry.load(world);

        let mut trace = east_trace();
        assert!(trace.execute(&registry).unwrap().is_some());

        trace.continue_while_block(|located| located.block == BlockId::AIR);
        assert_eq!(trace.execute(&registry).unwrap(), None);
    }
}
