//! Constructors for the two trace kinds and the canonical block selections

use super::{BlockRayTrace, EntityRayTrace, RayTrace};
use crate::world::{is_passable, LocatedBlock, TraceEntity};
use crate::TraceConfig;

/// Trace for the first non-passable block
pub fn block_ray_trace<E: TraceEntity>() -> BlockRayTrace<E> {
    RayTrace::new()
}

pub fn block_ray_trace_with_config<E: TraceEntity>(config: &TraceConfig) -> BlockRayTrace<E> {
    RayTrace::with_config(config)
}

/// Trace for the nearest entity
pub fn entity_ray_trace<E: TraceEntity>() -> EntityRayTrace<E> {
    RayTrace::new()
}

pub fn entity_ray_trace_with_config<E: TraceEntity>(config: &TraceConfig) -> EntityRayTrace<E> {
    RayTrace::with_config(config)
}

/// Accepts only air-like blocks
pub fn only_passable() -> impl Fn(&LocatedBlock) -> bool + Copy + 'static {
    |located: &LocatedBlock| is_passable(located.block)
}

/// Accepts everything but air-like blocks
pub fn not_passable() -> impl Fn(&LocatedBlock) -> bool + Copy + 'static {
    |located: &LocatedBlock| !is_passable(located.block)
}
