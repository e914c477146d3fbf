//! Ray traces through a voxel world
//!
//! - stepper_data / stepper_operations: exact cell-by-cell walk along a ray
//! - ray_trace: the configurable request and the shared traversal driver
//! - target, block_target, entity_target: what counts as a hit
//! - factory: constructors and canonical block selections

pub mod block_target;
pub mod entity_target;
pub mod factory;
pub mod ray_trace;
pub mod result;
pub mod stepper_data;
pub mod stepper_operations;
pub mod target;

use crate::world::BoxEntity;

pub use block_target::BlockTarget;
pub use entity_target::EntityTarget;
pub use factory::{
    block_ray_trace, block_ray_trace_with_config, entity_ray_trace, entity_ray_trace_with_config,
    not_passable, only_passable,
};
pub use ray_trace::RayTrace;
pub use result::RayTraceHit;
pub use stepper_data::{GridStepper, TraversalSegment, TraversalState};
pub use stepper_operations::create_grid_stepper;
pub use target::{Predicate, TargetStrategy};

/// Trace seeking the first selected block
pub type BlockRayTrace<E = BoxEntity> = RayTrace<BlockTarget, E>;

/// Trace seeking the nearest selected entity
pub type EntityRayTrace<E = BoxEntity> = RayTrace<EntityTarget, E>;
